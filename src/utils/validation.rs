use crate::config::ConverterConfig;
use crate::models::{ConversionError, UploadedImage};

/// Upload constraints derived from the service configuration
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: usize,
}

impl ValidationRules {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            allowed_extensions: config.allowed_extensions.clone(),
            max_file_size: config.max_file_size,
        }
    }
}

/// Rejects empty filenames and names without an allowed suffix.
///
/// The suffix match is case-sensitive: `photo.PNG` is not accepted.
pub fn validate_filename(filename: &str, rules: &ValidationRules) -> Result<(), ConversionError> {
    if filename.is_empty() {
        return Err(ConversionError::MissingFilename);
    }

    if !rules
        .allowed_extensions
        .iter()
        .any(|ext| filename.ends_with(ext.as_str()))
    {
        return Err(ConversionError::UnsupportedType {
            filename: filename.to_string(),
        });
    }

    Ok(())
}

/// Validates file size against maximum limit
pub fn validate_file_size(
    filename: &str,
    size: usize,
    rules: &ValidationRules,
) -> Result<(), ConversionError> {
    if size > rules.max_file_size {
        return Err(ConversionError::FileTooLarge {
            filename: filename.to_string(),
            size,
            max_size: rules.max_file_size,
        });
    }
    Ok(())
}

/// Runs every pre-decode check, in the order clients see the errors
pub fn validate_upload(upload: &UploadedImage, rules: &ValidationRules) -> Result<(), ConversionError> {
    validate_filename(&upload.filename, rules)?;
    validate_file_size(&upload.filename, upload.size(), rules)
}
