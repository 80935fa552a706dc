//! Application state for the HTTP service

use mal_scraper::Fetch;
use shared::Config;
use std::sync::Arc;

/// Shared state handed to every route handler
///
/// Cloned per request (cheap Arc clones). The fetcher is kept behind the
/// `Fetch` trait so tests can swap in a scripted one.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn Fetch>,
}

impl AppState {
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }
}
