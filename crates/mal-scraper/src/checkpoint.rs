//! Checkpoint tracking for resumable runs.
//!
//! Persists the set of completed MAL IDs to a JSON file so an interrupted
//! run can be resumed without refetching. Saved every `save_interval`
//! completed records and once at the end of the run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointState {
    completed_ids: Vec<u32>,
}

/// Tracks scraping progress across runs
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    completed: HashSet<u32>,
    save_interval: usize,
    /// Completions since the last save
    unsaved: usize,
}

impl Checkpoint {
    /// Load a checkpoint from disk, or start fresh if the file is missing
    ///
    /// With `resume` set to false an existing checkpoint file is deleted
    /// first.
    pub fn load(path: impl AsRef<Path>, resume: bool, save_interval: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !resume && path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete checkpoint: {}", path.display()))?;
            info!(path = %path.display(), "Deleted old checkpoint to start fresh");
        }

        let completed = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read checkpoint: {}", path.display()))?;
            let state: CheckpointState = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse checkpoint: {}", path.display()))?;

            info!(
                path = %path.display(),
                completed = state.completed_ids.len(),
                "Loaded checkpoint"
            );
            state.completed_ids.into_iter().collect()
        } else {
            debug!(path = %path.display(), "No checkpoint file found, starting fresh");
            HashSet::new()
        };

        Ok(Self {
            path,
            completed,
            save_interval: save_interval.max(1),
            unsaved: 0,
        })
    }

    /// Whether the given ID has already been completed in a previous run
    pub fn is_completed(&self, mal_id: u32) -> bool {
        self.completed.contains(&mal_id)
    }

    /// Mark an ID as completed, saving periodically
    pub fn mark_completed(&mut self, mal_id: u32) -> Result<()> {
        if !self.completed.insert(mal_id) {
            return Ok(());
        }

        self.unsaved += 1;
        if self.unsaved >= self.save_interval {
            self.save()?;
        }
        Ok(())
    }

    /// Persist the checkpoint to disk
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create checkpoint directory: {}", parent.display())
                })?;
            }
        }

        let mut completed_ids: Vec<u32> = self.completed.iter().copied().collect();
        completed_ids.sort_unstable();

        let content = serde_json::to_string(&CheckpointState { completed_ids })
            .context("Failed to serialize checkpoint")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write checkpoint: {}", self.path.display()))?;

        self.unsaved = 0;
        debug!(path = %self.path.display(), completed = self.completed.len(), "Checkpoint saved");
        Ok(())
    }

    /// Number of completed IDs
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_starts_fresh() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let checkpoint = Checkpoint::load(temp_dir.path().join("cp.json"), true, 10)?;
        assert_eq!(checkpoint.completed_count(), 0);
        assert!(!checkpoint.is_completed(1));
        Ok(())
    }

    #[test]
    fn test_mark_save_and_reload() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cp.json");

        let mut checkpoint = Checkpoint::load(&path, true, 10)?;
        checkpoint.mark_completed(52034)?;
        checkpoint.mark_completed(58259)?;
        checkpoint.save()?;

        let reloaded = Checkpoint::load(&path, true, 10)?;
        assert_eq!(reloaded.completed_count(), 2);
        assert!(reloaded.is_completed(52034));
        assert!(reloaded.is_completed(58259));
        assert!(!reloaded.is_completed(1));

        Ok(())
    }

    #[test]
    fn test_save_interval_triggers_write() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cp.json");

        let mut checkpoint = Checkpoint::load(&path, true, 2)?;
        checkpoint.mark_completed(1)?;
        assert!(!path.exists());
        checkpoint.mark_completed(2)?;
        // Second completion hits the interval and persists
        assert!(path.exists());

        Ok(())
    }

    #[test]
    fn test_no_resume_deletes_existing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cp.json");

        let mut checkpoint = Checkpoint::load(&path, true, 10)?;
        checkpoint.mark_completed(1)?;
        checkpoint.save()?;
        assert!(path.exists());

        let fresh = Checkpoint::load(&path, false, 10)?;
        assert_eq!(fresh.completed_count(), 0);
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_duplicate_completion_is_noop() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cp.json");

        let mut checkpoint = Checkpoint::load(&path, true, 2)?;
        checkpoint.mark_completed(1)?;
        checkpoint.mark_completed(1)?;
        // Duplicate does not count toward the save interval
        assert!(!path.exists());
        assert_eq!(checkpoint.completed_count(), 1);

        Ok(())
    }
}
