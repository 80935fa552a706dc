//! Jikan API v4 response types.
//!
//! These types represent the JSON responses from the Jikan API, plus the
//! conversion into the normalized record that gets persisted.

use serde::{Deserialize, Serialize};
use shared::AnimeRecord;

/// Full anime details response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetailsResponse {
    pub data: AnimeDetails,
}

/// Full anime details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetails {
    pub mal_id: u32,
    pub url: String,

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_synonyms: Vec<String>,

    // Type and status
    #[serde(rename = "type")]
    pub anime_type: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    #[serde(default)]
    pub airing: bool,

    // Dates
    #[serde(default)]
    pub aired: Aired,
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
    pub background: Option<String>,

    // Season
    pub season: Option<String>,
    pub year: Option<u32>,

    // Producers, licensors, studios
    #[serde(default)]
    pub producers: Vec<MalEntity>,
    #[serde(default)]
    pub licensors: Vec<MalEntity>,
    #[serde(default)]
    pub studios: Vec<MalEntity>,

    // Genres, themes, demographics
    #[serde(default)]
    pub genres: Vec<MalEntity>,
    #[serde(default)]
    pub themes: Vec<MalEntity>,
    #[serde(default)]
    pub demographics: Vec<MalEntity>,
}

/// Aired dates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aired {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// MAL entity (genre, studio, producer, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalEntity {
    pub mal_id: u32,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    pub url: String,
}

/// Error response from the Jikan API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanError {
    pub status: u16,
    pub message: String,
}

fn names(entities: &[MalEntity]) -> Vec<String> {
    entities.iter().map(|e| e.name.clone()).collect()
}

impl From<AnimeDetails> for AnimeRecord {
    fn from(details: AnimeDetails) -> Self {
        AnimeRecord {
            mal_id: details.mal_id,
            url: details.url,
            title: details.title,
            title_english: details.title_english,
            title_japanese: details.title_japanese,
            title_synonyms: details.title_synonyms,
            anime_type: details.anime_type,
            source: details.source,
            episodes: details.episodes,
            status: details.status,
            airing: details.airing,
            aired_from: details.aired.from,
            aired_to: details.aired.to,
            season: details.season,
            year: details.year,
            duration: details.duration,
            rating: details.rating,
            score: details.score,
            scored_by: details.scored_by,
            rank: details.rank,
            popularity: details.popularity,
            members: details.members,
            favorites: details.favorites,
            synopsis: details.synopsis,
            genres: names(&details.genres),
            themes: names(&details.themes),
            demographics: names(&details.demographics),
            studios: names(&details.studios),
            producers: names(&details.producers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_details_deserialize() {
        let json = serde_json::json!({
            "mal_id": 52034,
            "url": "https://myanimelist.net/anime/52034",
            "title": "Oshi no Ko",
            "title_english": null,
            "title_japanese": null,
            "type": "TV",
            "source": "Manga",
            "episodes": 11,
            "status": "Finished Airing",
            "airing": false,
            "duration": null,
            "rating": null,
            "score": 8.6,
            "scored_by": null,
            "rank": null,
            "popularity": null,
            "members": null,
            "favorites": null,
            "synopsis": null,
            "background": null,
            "season": "spring",
            "year": 2023
        });

        let details: AnimeDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.mal_id, 52034);
        assert_eq!(details.episodes, Some(11));
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_record_conversion_flattens_entities() {
        let details = AnimeDetails {
            mal_id: 1,
            url: "https://myanimelist.net/anime/1".to_string(),
            title: "Cowboy Bebop".to_string(),
            title_english: Some("Cowboy Bebop".to_string()),
            title_japanese: None,
            title_synonyms: vec![],
            anime_type: Some("TV".to_string()),
            source: None,
            episodes: Some(26),
            status: None,
            airing: false,
            aired: Aired::default(),
            duration: None,
            rating: None,
            score: None,
            scored_by: None,
            rank: None,
            popularity: None,
            members: None,
            favorites: None,
            synopsis: None,
            background: None,
            season: None,
            year: Some(1998),
            producers: vec![],
            licensors: vec![],
            studios: vec![MalEntity {
                mal_id: 14,
                entity_type: "anime".to_string(),
                name: "Sunrise".to_string(),
                url: String::new(),
            }],
            genres: vec![MalEntity {
                mal_id: 1,
                entity_type: "anime".to_string(),
                name: "Action".to_string(),
                url: String::new(),
            }],
            themes: vec![],
            demographics: vec![],
        };

        let record = AnimeRecord::from(details);
        assert_eq!(record.studios, vec!["Sunrise"]);
        assert_eq!(record.genres, vec!["Action"]);
        assert_eq!(record.year, Some(1998));
    }
}
