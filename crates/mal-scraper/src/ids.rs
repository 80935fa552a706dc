//! Identifier resolution.
//!
//! Merges MAL IDs supplied via the config file and the command line into
//! an ordered, deduplicated sequence.

use shared::ScrapeError;
use std::collections::HashSet;

/// Resolve the set of MAL IDs to scrape.
///
/// Config-supplied IDs come first, then command-line IDs; the first
/// occurrence of a duplicate wins. Returns a config error when the merged
/// set is empty.
pub fn resolve_ids(config_ids: &[u32], cli_ids: &[u32]) -> Result<Vec<u32>, ScrapeError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for &id in config_ids.iter().chain(cli_ids.iter()) {
        if seen.insert(id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(ScrapeError::Config(
            "no MAL IDs provided via command line or config file".to_string(),
        ));
    }

    Ok(ids)
}
