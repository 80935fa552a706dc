//! MAL scraper library for fetching anime metadata from MyAnimeList.
//!
//! Given a set of MAL IDs this crate performs rate-limited concurrent
//! retrieval through the Jikan API with bounded retry, and streams results
//! into a JSON or JSON-lines output sink.

pub mod api;
pub mod checkpoint;
pub mod ids;
pub mod orchestrator;
pub mod sink;

pub use api::{MalClient, RateLimiter};
pub use checkpoint::Checkpoint;
pub use ids::resolve_ids;
pub use orchestrator::{BatchStats, Fetch, Orchestrator};
pub use sink::{OutputFormat, ResultSink};
