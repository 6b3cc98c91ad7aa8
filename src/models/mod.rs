use image::RgbImage;
use std::path::PathBuf;
use thiserror::Error;

/// Raw upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// An image normalized to 8-bit RGB, ready to become a page
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub filename: String,
    pub bitmap: RgbImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

/// Decoded images of a single request, in page order
#[derive(Debug, Default)]
pub struct ConversionJob {
    images: Vec<DecodedImage>,
}

impl ConversionJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: DecodedImage) {
        self.images.push(image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[DecodedImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<DecodedImage> {
        self.images
    }
}

impl FromIterator<DecodedImage> for ConversionJob {
    fn from_iter<I: IntoIterator<Item = DecodedImage>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}

/// A generated PDF sitting in the output directory
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Storage key, also used as the download filename
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub page_count: usize,
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("No file part in request")]
    MissingFilePart,

    #[error("Empty filename")]
    MissingFilename,

    #[error("Invalid file type: {filename}")]
    UnsupportedType { filename: String },

    #[error(
        "File too large: {filename} ({:.2}MB). Max {}MB allowed.",
        megabytes(.size),
        whole_megabytes(.max_size)
    )]
    FileTooLarge {
        filename: String,
        size: usize,
        max_size: usize,
    },

    #[error("Error processing image {filename}: {detail}")]
    DecodeError { filename: String, detail: String },

    #[error("No valid images uploaded!")]
    NoValidImages,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn megabytes(bytes: &usize) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

fn whole_megabytes(bytes: &usize) -> usize {
    *bytes / (1024 * 1024)
}

impl ConversionError {
    /// Everything except `Internal` is caused by the request contents
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ConversionError::Internal(_))
    }
}
