//! Batch analysis over a bounded pool of blocking workers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task;
use tracing::{info, warn};

use crate::extractor::Extractor;
use crate::models::FileEntry;
use crate::sources::SourceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Result of one batch. `entries` is always in submission order and has the same length
/// as the input; entries skipped because of cancellation are returned untouched.
#[derive(Debug)]
pub struct BatchOutcome {
    pub entries: Vec<FileEntry>,
    pub completed: usize,
    pub cancelled: bool,
}

#[derive(Clone)]
pub struct BatchAnalyzer {
    extractor: Arc<Extractor>,
    sources: Arc<SourceRegistry>,
    workers: usize,
}

impl BatchAnalyzer {
    pub fn new(extractor: Extractor, sources: SourceRegistry, workers: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            sources: Arc::new(sources),
            workers: workers.max(1),
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Analyzes every entry without progress reporting or cancellation.
    pub async fn analyze_all(&self, entries: Vec<FileEntry>) -> Vec<FileEntry> {
        self.analyze_batch(entries, None, Arc::new(AtomicBool::new(false)))
            .await
            .entries
    }

    /// Analyzes `entries` with at most `workers` files in flight.
    ///
    /// Progress events are sent after each finished entry; the receiver must be drained or
    /// sized for the batch. Once `cancel` is set, entries that have not started are skipped.
    /// A panic while analyzing one entry marks only that entry as an error.
    pub async fn analyze_batch(
        &self,
        entries: Vec<FileEntry>,
        progress: Option<mpsc::Sender<Progress>>,
        cancel: Arc<AtomicBool>,
    ) -> BatchOutcome {
        let total = entries.len();
        info!(total, workers = self.workers, "analysis batch started");
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = entries
            .iter()
            .cloned()
            .map(|entry| {
                let semaphore = semaphore.clone();
                let cancel = cancel.clone();
                let completed = completed.clone();
                let progress = progress.clone();
                let extractor = self.extractor.clone();
                let sources = self.sources.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    if cancel.load(Ordering::SeqCst) {
                        return None;
                    }
                    let analyzed = task::spawn_blocking(move || {
                        let mut entry = entry;
                        extractor.analyze(&mut entry, &sources);
                        entry
                    })
                    .await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(tx) = &progress {
                        let _ = tx.send(Progress { completed: done, total }).await;
                    }
                    Some(analyzed.map_err(|e| e.to_string()))
                })
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;
        for (handle, original) in handles.into_iter().zip(entries) {
            match handle.await {
                Ok(Some(Ok(entry))) => results.push(entry),
                Ok(None) => {
                    cancelled = true;
                    results.push(original);
                }
                Ok(Some(Err(reason))) => results.push(failed(original, &reason)),
                Err(e) => results.push(failed(original, &e.to_string())),
            }
        }

        let completed = completed.load(Ordering::SeqCst);
        info!(total, completed, cancelled, "analysis batch finished");
        BatchOutcome {
            entries: results,
            completed,
            cancelled,
        }
    }
}

fn failed(mut entry: FileEntry, reason: &str) -> FileEntry {
    warn!(path = %entry.original_path.display(), %reason, "analysis failed");
    entry.mark_error(format!("analysis failed: {}", reason));
    entry
}
