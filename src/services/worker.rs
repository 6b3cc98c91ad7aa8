use crate::services::storage::StorageService;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

/// Periodically clears scratch directories of files that outlived the
/// retention window, e.g. artifacts whose timers died with a previous process.
pub struct BackgroundWorker {
    stores: Vec<Arc<dyn StorageService>>,
    max_age: Duration,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl BackgroundWorker {
    pub fn new(
        stores: Vec<Arc<dyn StorageService>>,
        max_age: Duration,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            stores,
            max_age,
            interval,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🚀 Background worker started");

        // Leftovers from a previous run go first
        self.perform_cleanup().await;

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Background worker shutting down");
                    break;
                }
                _ = sleep(self.interval) => {
                    self.perform_cleanup().await;
                }
            }
        }
    }

    pub async fn perform_cleanup(&self) -> usize {
        tracing::debug!("🧹 Sweeping scratch directories...");

        let mut total = 0;
        for store in &self.stores {
            match store.purge_older_than(self.max_age).await {
                Ok(removed) => total += removed,
                Err(e) => tracing::error!("Scratch sweep failed: {}", e),
            }
        }

        if total > 0 {
            tracing::info!("✅ Sweep removed {} stale file(s)", total);
        }
        total
    }
}
