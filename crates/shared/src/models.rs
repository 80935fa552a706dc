//! Data models for the scraper.
//!
//! Defines the normalized anime record and the persisted output record
//! written once per identifier.

use crate::error::FetchErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized anime metadata from MyAnimeList
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub mal_id: u32,
    pub url: String,

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_synonyms: Vec<String>,

    // Type and status
    pub anime_type: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub airing: bool,

    // Dates
    pub aired_from: Option<String>,
    pub aired_to: Option<String>,
    pub season: Option<String>,
    pub year: Option<u32>,
    pub duration: Option<String>,
    pub rating: Option<String>,

    // Scores and rankings
    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    // Synopsis
    pub synopsis: Option<String>,

    // Classifications
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub demographics: Vec<String>,
    #[serde(default)]
    pub studios: Vec<String>,
    #[serde(default)]
    pub producers: Vec<String>,
}

/// Persisted form of a fetch outcome, written once per identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutputRecord {
    Success {
        mal_id: u32,
        fetched_at: DateTime<Utc>,
        attempts: u32,
        anime: AnimeRecord,
    },
    Failure {
        mal_id: u32,
        fetched_at: DateTime<Utc>,
        attempts: u32,
        error: FetchErrorKind,
        message: String,
    },
}

impl OutputRecord {
    pub fn success(mal_id: u32, attempts: u32, anime: AnimeRecord) -> Self {
        OutputRecord::Success {
            mal_id,
            fetched_at: Utc::now(),
            attempts,
            anime,
        }
    }

    pub fn failure(mal_id: u32, attempts: u32, error: FetchErrorKind, message: String) -> Self {
        OutputRecord::Failure {
            mal_id,
            fetched_at: Utc::now(),
            attempts,
            error,
            message,
        }
    }

    /// The identifier this record was fetched for
    pub fn mal_id(&self) -> u32 {
        match self {
            OutputRecord::Success { mal_id, .. } => *mal_id,
            OutputRecord::Failure { mal_id, .. } => *mal_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutputRecord::Success { .. })
    }
}
