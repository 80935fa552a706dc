//! HTTP routes for the scraping service.
//!
//! Exposes the same orchestrator path as the CLI: a scrape request runs
//! synchronously and reports batch statistics once the output file is
//! written. Per-ID fetch failures land in the output as failure-tagged
//! records and do not fail the request; only config and sink problems map
//! to error statuses.

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mal_scraper::{resolve_ids, BatchStats, Orchestrator, OutputFormat, ResultSink};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::ScrapeError;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scrape-anime", post(scrape_anime))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - simple liveness probe
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Scrape request body
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub mal_ids: Vec<u32>,
    pub output_path: Option<String>,
    pub format: Option<String>,
}

/// Scrape response body
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub output_path: String,
    pub stats: BatchStats,
}

/// POST /scrape-anime - run the orchestrator for the requested IDs
pub async fn scrape_anime(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let ids = resolve_ids(&[], &request.mal_ids)?;

    let output_path = request
        .output_path
        .unwrap_or_else(|| "output/mal_titles.jsonl".to_string());

    let format = match request.format {
        Some(format) => format.parse::<OutputFormat>()?,
        None => OutputFormat::from_path(Path::new(&output_path)),
    };

    info!(ids = ids.len(), output = %output_path, "Scrape request received");

    let sink = ResultSink::create(&output_path, format)?;
    let orchestrator = Orchestrator::new(
        state.fetcher.clone(),
        state.config.scraper.concurrency,
    );

    let stats = orchestrator
        .run(&ids, sink, None, CancellationToken::new())
        .await?;

    info!(
        fetched = stats.fetched,
        failed = stats.failed,
        output = %output_path,
        "Scrape request complete"
    );

    Ok(Json(ScrapeResponse {
        message: "anime scraping completed".to_string(),
        output_path,
        stats,
    }))
}

/// HTTP wrapper for scraper errors
#[derive(Debug)]
pub struct ApiError(ScrapeError);

impl From<ScrapeError> for ApiError {
    fn from(error: ScrapeError) -> Self {
        ApiError(error)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            ScrapeError::Config(_) => StatusCode::BAD_REQUEST,
            ScrapeError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ScrapeError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match &self.0 {
            ScrapeError::Config(_) => "config_error",
            ScrapeError::Fetch(_) => "fetch_error",
            ScrapeError::Sink(_) => "sink_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error_code(),
            "message": self.0.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}
