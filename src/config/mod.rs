use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Multipart field that carries the images to convert
pub const IMAGES_FIELD: &str = "images";

const MIB: usize = 1024 * 1024;

/// Runtime configuration for the conversion service
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Maximum size of a single image in bytes (default: 10 MB)
    pub max_file_size: usize,

    /// Maximum size of a whole request body in bytes (default: 256 MB)
    pub max_request_size: usize,

    /// Accepted filename suffixes, matched case-sensitively
    pub allowed_extensions: Vec<String>,

    /// How long a generated PDF stays on disk (default: 300 seconds)
    pub retention: Duration,

    /// Interval between scratch directory sweeps (default: 600 seconds)
    pub sweep_interval: Duration,

    /// Decoded images above this pixel count are rejected (default: 178956970)
    pub max_image_pixels: u64,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,

    /// Scratch directory for inbound data
    pub upload_dir: PathBuf,

    /// Directory for generated PDFs
    pub output_dir: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * MIB,
            max_request_size: 256 * MIB,
            allowed_extensions: default_extensions(),
            retention: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(600),
            max_image_pixels: 178_956_970,
            allowed_origins: vec!["https://converter-green-xi.vercel.app".to_string()],
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
        }
    }
}

fn default_extensions() -> Vec<String> {
    [".jpg", ".jpeg", ".png", ".bmp", ".gif", ".tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ConverterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_request_size),

            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .ok()
                .map(|v| split_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(default.allowed_extensions),

            retention: env::var("RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.retention),

            sweep_interval: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.sweep_interval),

            max_image_pixels: env::var("MAX_IMAGE_PIXELS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_image_pixels),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(default.allowed_origins),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),
        }
    }

    /// Create config for local development (localhost origins, short retention)
    pub fn development() -> Self {
        Self {
            retention: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            // Development: localhost origins only
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Ceiling for a single file, in whole megabytes, as shown to clients
    pub fn max_file_size_mb(&self) -> usize {
        self.max_file_size / MIB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.max_file_size_mb(), 10);
        assert_eq!(config.retention, Duration::from_secs(300));
        assert_eq!(config.allowed_extensions.len(), 6);
        assert_eq!(config.max_image_pixels, 178_956_970);
        assert_eq!(
            config.allowed_origins,
            vec!["https://converter-green-xi.vercel.app".to_string()]
        );
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_development_config() {
        let config = ConverterConfig::development();
        assert_eq!(config.retention, Duration::from_secs(60));
        assert!(
            config
                .allowed_origins
                .iter()
                .all(|o| o.contains("localhost") || o.contains("127.0.0.1"))
        );
        assert_eq!(config.max_file_size, ConverterConfig::default().max_file_size);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" .png, .jpg ,,"),
            vec![".png".to_string(), ".jpg".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_from_env_overrides() {
        unsafe {
            env::set_var("RETENTION_SECS", "42");
            env::set_var("ALLOWED_EXTENSIONS", ".png,.webp");
        }
        let config = ConverterConfig::from_env();
        unsafe {
            env::remove_var("RETENTION_SECS");
            env::remove_var("ALLOWED_EXTENSIONS");
        }
        assert_eq!(config.retention, Duration::from_secs(42));
        assert_eq!(
            config.allowed_extensions,
            vec![".png".to_string(), ".webp".to_string()]
        );
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }
}
