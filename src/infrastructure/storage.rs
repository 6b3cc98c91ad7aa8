use crate::config::ConverterConfig;
use crate::services::storage::LocalStorageService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Scratch stores for inbound data and generated PDFs
pub struct ScratchStorage {
    pub uploads: Arc<LocalStorageService>,
    pub output: Arc<LocalStorageService>,
}

/// Create both scratch directories if needed and wrap them in storage services
pub async fn setup_storage(config: &ConverterConfig) -> Result<ScratchStorage> {
    for dir in [&config.upload_dir, &config.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    info!(
        "📁 Scratch storage: uploads={} output={}",
        config.upload_dir.display(),
        config.output_dir.display()
    );

    Ok(ScratchStorage {
        uploads: Arc::new(LocalStorageService::new(&config.upload_dir)),
        output: Arc::new(LocalStorageService::new(&config.output_dir)),
    })
}
