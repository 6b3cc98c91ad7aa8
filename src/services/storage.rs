use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::fs::File;

/// An opened object ready to be streamed back to a client
pub struct StoredObject {
    pub file: File,
    pub size: u64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Write `data` under `key`, returning the path it landed at
    async fn upload_file(&self, key: &str, data: Vec<u8>) -> Result<PathBuf>;
    /// Remove `key`. Returns `Ok(false)` when it was already gone.
    async fn delete_file(&self, key: &str) -> Result<bool>;
    async fn file_exists(&self, key: &str) -> Result<bool>;
    async fn open_file(&self, key: &str) -> Result<StoredObject>;
    /// Remove every object whose last modification is older than `max_age`
    async fn purge_older_than(&self, max_age: Duration) -> Result<usize>;
    async fn is_available(&self) -> bool;
}

/// Flat directory on the local filesystem
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
        {
            return Err(anyhow!("Invalid storage key: {:?}", key));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn upload_file(&self, key: &str, data: Vec<u8>) -> Result<PathBuf> {
        let path = self.resolve(key)?;
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    async fn delete_file(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn open_file(&self, key: &str) -> Result<StoredObject> {
        let path = self.resolve(key)?;
        let file = File::open(&path).await?;
        let size = file.metadata().await?.len();
        Ok(StoredObject { file, size })
    }

    async fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < max_age {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::info!("Removed stale file {}", entry.path().display());
                    removed += 1;
                }
                // Raced with a scheduled deletion
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove {}: {}", entry.path().display(), e);
                }
            }
        }

        Ok(removed)
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
