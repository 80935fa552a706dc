//! Batch fetch orchestrator.
//!
//! Drives fetches across the identifier set with bounded concurrency and
//! streams every result straight into the sink. Results flow through a
//! channel into a single writer task, so sink and checkpoint writes are
//! never interleaved. Per-identifier failures become failure-tagged
//! records; a sink failure aborts the run.

use crate::checkpoint::Checkpoint;
use crate::sink::ResultSink;
use async_trait::async_trait;
use serde::Serialize;
use shared::{OutputRecord, ScrapeError};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Seam between the orchestrator and the concrete fetcher.
///
/// A fetcher turns one identifier into exactly one output record, success
/// or failure tagged; it never errors out of the batch.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, mal_id: u32) -> OutputRecord;
}

/// Statistics for one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Unique identifiers requested
    pub requested: usize,
    /// Records fetched successfully
    pub fetched: usize,
    /// Failure-tagged records written
    pub failed: usize,
    /// Identifiers skipped because the checkpoint already had them
    pub skipped: usize,
}

/// Coordinates concurrent fetches and streams results into the sink
pub struct Orchestrator {
    fetcher: Arc<dyn Fetch>,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn Fetch>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Run the batch: fetch every pending identifier and write one record
    /// each to the sink.
    ///
    /// Cancelling `shutdown` stops issuing new fetches; in-flight fetches
    /// complete and their records are still flushed, so partial output
    /// remains valid.
    pub async fn run(
        &self,
        ids: &[u32],
        sink: ResultSink,
        checkpoint: Option<Checkpoint>,
        shutdown: CancellationToken,
    ) -> Result<BatchStats, ScrapeError> {
        let mut stats = BatchStats {
            requested: ids.len(),
            ..Default::default()
        };

        let pending: Vec<u32> = match &checkpoint {
            Some(cp) => ids.iter().copied().filter(|id| !cp.is_completed(*id)).collect(),
            None => ids.to_vec(),
        };
        stats.skipped = ids.len() - pending.len();

        if stats.skipped > 0 {
            info!(skipped = stats.skipped, "Skipping already-completed IDs");
        }

        info!(
            requested = stats.requested,
            pending = pending.len(),
            concurrency = self.concurrency,
            "Starting batch"
        );

        let input_order = ids.to_vec();
        let (tx, mut rx) = mpsc::channel::<OutputRecord>(self.concurrency);

        // Single writer task owns the sink and the checkpoint
        let writer = tokio::spawn(async move {
            let mut sink = sink;
            let mut checkpoint = checkpoint;
            let mut fetched = 0usize;
            let mut failed = 0usize;

            while let Some(record) = rx.recv().await {
                if record.is_success() {
                    fetched += 1;
                } else {
                    failed += 1;
                }

                sink.write(&record)?;

                if let Some(cp) = checkpoint.as_mut() {
                    if record.is_success() {
                        // Checkpoint trouble must not lose fetched data
                        if let Err(e) = cp.mark_completed(record.mal_id()) {
                            warn!(error = %e, "Failed to update checkpoint");
                        }
                    }
                }
            }

            if let Some(cp) = checkpoint.as_mut() {
                if let Err(e) = cp.save() {
                    warn!(error = %e, "Failed to save checkpoint");
                }
            }

            sink.finish(&input_order)?;
            Ok::<(usize, usize), ScrapeError>((fetched, failed))
        });

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(pending.len());

        for mal_id in pending {
            let permit = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, not issuing further fetches");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let fetcher = Arc::clone(&self.fetcher);
            let tx = tx.clone();

            tasks.push(tokio::spawn(async move {
                let record = fetcher.fetch(mal_id).await;
                // The writer is gone if the sink failed; the record is
                // dropped then and the run is already aborting
                let _ = tx.send(record).await;
                drop(permit);
            }));
        }
        drop(tx);

        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Fetch task panicked");
            }
        }

        let (fetched, failed) = writer
            .await
            .map_err(|e| {
                ScrapeError::Sink(std::io::Error::new(std::io::ErrorKind::Other, e))
            })??;
        stats.fetched = fetched;
        stats.failed = failed;

        info!(
            requested = stats.requested,
            fetched = stats.fetched,
            failed = stats.failed,
            skipped = stats.skipped,
            "Batch complete"
        );

        Ok(stats)
    }
}
