use crate::models::{ConversionError, DecodedImage, UploadedImage};
use image::io::Reader as ImageReader;
use std::io::Cursor;

/// Decodes uploads into RGB bitmaps, refusing decompression bombs
#[derive(Debug, Clone, Copy)]
pub struct ImageDecoder {
    max_pixels: u64,
}

impl ImageDecoder {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    /// Decode an upload, sniffing the format from its content.
    ///
    /// Alpha and palette information is flattened away. Multi-frame formats
    /// contribute their first frame only.
    pub fn decode(&self, upload: &UploadedImage) -> Result<DecodedImage, ConversionError> {
        let decode_error = |detail: String| ConversionError::DecodeError {
            filename: upload.filename.clone(),
            detail,
        };

        // Read only the header first so oversized images never get allocated
        let (width, height) = ImageReader::new(Cursor::new(&upload.data))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .into_dimensions()
            .map_err(|e| decode_error(e.to_string()))?;

        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.max_pixels {
            return Err(decode_error(format!(
                "Image size ({} pixels) exceeds limit of {} pixels, could be decompression bomb DOS attack.",
                pixels, self.max_pixels
            )));
        }

        let img = ImageReader::new(Cursor::new(&upload.data))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))?;

        tracing::debug!(
            "Decoded {} ({}x{}, {:?})",
            upload.filename,
            width,
            height,
            img.color()
        );

        Ok(DecodedImage {
            filename: upload.filename.clone(),
            bitmap: img.to_rgb8(),
        })
    }
}
