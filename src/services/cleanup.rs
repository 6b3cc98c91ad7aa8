use crate::services::storage::StorageService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Arms one-shot delayed deletions of stored artifacts
#[derive(Clone)]
pub struct CleanupScheduler {
    storage: Arc<dyn StorageService>,
    delay: Duration,
}

/// Handle to a pending deletion. Dropping it leaves the deletion armed.
pub struct ScheduledDeletion {
    key: String,
    handle: JoinHandle<()>,
}

impl ScheduledDeletion {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Disarm the deletion if it has not fired yet
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the deletion to run (or be cancelled)
    pub async fn wait(self) {
        let _ = self.handle.await;
    }
}

impl CleanupScheduler {
    pub fn new(storage: Arc<dyn StorageService>, delay: Duration) -> Self {
        Self { storage, delay }
    }

    /// Delete `key` once the retention delay has elapsed.
    ///
    /// Failures are logged and never reported back; a key that is already
    /// gone counts as deleted.
    pub fn schedule(&self, key: &str) -> ScheduledDeletion {
        let storage = self.storage.clone();
        let delay = self.delay;
        let task_key = key.to_string();

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            match storage.delete_file(&task_key).await {
                Ok(true) => tracing::info!("🧹 Deleted expired artifact {}", task_key),
                Ok(false) => tracing::debug!("Artifact {} already removed", task_key),
                Err(e) => tracing::warn!("Failed to delete artifact {}: {}", task_key, e),
            }
        });

        tracing::debug!("Scheduled deletion of {} in {:?}", key, delay);
        ScheduledDeletion {
            key: key.to_string(),
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::LocalStorageService;

    fn setup(dir: &std::path::Path, delay: Duration) -> (Arc<dyn StorageService>, CleanupScheduler) {
        let storage: Arc<dyn StorageService> = Arc::new(LocalStorageService::new(dir));
        let scheduler = CleanupScheduler::new(storage.clone(), delay);
        (storage, scheduler)
    }

    #[tokio::test]
    async fn test_deletes_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, scheduler) = setup(dir.path(), Duration::from_millis(50));
        storage.upload_file("x.pdf", vec![1, 2, 3]).await.unwrap();

        let pending = scheduler.schedule("x.pdf");
        assert_eq!(pending.key(), "x.pdf");
        assert!(storage.file_exists("x.pdf").await.unwrap());

        pending.wait().await;
        assert!(!storage.file_exists("x.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_storage, scheduler) = setup(dir.path(), Duration::from_millis(1));
        let pending = scheduler.schedule("never-written.pdf");
        pending.wait().await;
    }

    #[tokio::test]
    async fn test_cancel_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, scheduler) = setup(dir.path(), Duration::from_millis(100));
        storage.upload_file("keep.pdf", vec![1]).await.unwrap();

        let pending = scheduler.schedule("keep.pdf");
        assert!(!pending.is_finished());
        pending.cancel();
        sleep(Duration::from_millis(200)).await;
        assert!(storage.file_exists("keep.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_handle_still_fires() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, scheduler) = setup(dir.path(), Duration::from_millis(20));
        storage.upload_file("fire.pdf", vec![1]).await.unwrap();

        drop(scheduler.schedule("fire.pdf"));
        sleep(Duration::from_millis(200)).await;
        assert!(!storage.file_exists("fire.pdf").await.unwrap());
    }
}
