use crate::config::ConverterConfig;
use crate::models::{ConversionError, ConversionJob, DecodedImage, OutputArtifact, UploadedImage};
use crate::services::cleanup::{CleanupScheduler, ScheduledDeletion};
use crate::services::image_decoder::ImageDecoder;
use crate::services::pdf_builder;
use crate::services::storage::{StorageService, StoredObject};
use crate::utils::validation::{self, ValidationRules};
use anyhow::anyhow;
use std::sync::Arc;
use uuid::Uuid;

/// Turns uploaded images into stored PDF artifacts
pub struct ConversionService {
    storage: Arc<dyn StorageService>,
    scheduler: CleanupScheduler,
    decoder: ImageDecoder,
    rules: ValidationRules,
}

impl ConversionService {
    pub fn new(storage: Arc<dyn StorageService>, config: &ConverterConfig) -> Self {
        Self {
            scheduler: CleanupScheduler::new(storage.clone(), config.retention),
            storage,
            decoder: ImageDecoder::new(config.max_image_pixels),
            rules: ValidationRules::from_config(config),
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn storage(&self) -> &Arc<dyn StorageService> {
        &self.storage
    }

    /// Validate and decode one upload. Decoding runs on the blocking pool.
    pub async fn decode(&self, upload: UploadedImage) -> Result<DecodedImage, ConversionError> {
        validation::validate_upload(&upload, &self.rules)?;

        let decoder = self.decoder;
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&upload))
            .await
            .map_err(|e| anyhow!("Decode task failed: {}", e))??;

        tracing::info!(
            "🖼️  Accepted {} ({}x{})",
            decoded.filename,
            decoded.width(),
            decoded.height()
        );
        Ok(decoded)
    }

    /// Assemble the job into a PDF and write it under a fresh random name
    pub async fn convert(&self, job: ConversionJob) -> Result<OutputArtifact, ConversionError> {
        if job.is_empty() {
            return Err(ConversionError::NoValidImages);
        }

        let page_count = job.len();
        let images = job.into_images();
        let pdf = tokio::task::spawn_blocking(move || pdf_builder::build_pdf(&images))
            .await
            .map_err(|e| anyhow!("PDF assembly task failed: {}", e))??;

        let filename = format!("converted_{}.pdf", Uuid::new_v4().simple());
        let size = pdf.len() as u64;
        let path = self.storage.upload_file(&filename, pdf).await?;

        tracing::info!(
            "📄 Wrote {} ({} page(s), {} bytes)",
            filename,
            page_count,
            size
        );

        Ok(OutputArtifact {
            filename,
            path,
            size,
            page_count,
        })
    }

    /// Open the artifact for the response and arm its deletion
    pub async fn deliver(
        &self,
        artifact: &OutputArtifact,
    ) -> Result<(StoredObject, ScheduledDeletion), ConversionError> {
        let object = self.storage.open_file(&artifact.filename).await?;
        let deletion = self.scheduler.schedule(&artifact.filename);
        Ok((object, deletion))
    }
}
