use crate::AppState;
use crate::api::error::AppError;
use crate::config::IMAGES_FIELD;
use crate::models::{ConversionError, ConversionJob, UploadedImage};
use crate::utils::validation;
use axum::{
    body::Body,
    extract::{Multipart, State, multipart::Field, multipart::MultipartError},
    http::{StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

/// Multipart form accepted by `/convert`
#[derive(ToSchema)]
pub struct ConvertRequest {
    /// One or more image files, converted in the order given
    #[schema(value_type = Vec<String>)]
    pub images: Vec<Vec<u8>>,
}

#[utoipa::path(
    post,
    path = "/convert",
    request_body(content = ConvertRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Converted PDF attachment"),
        (status = 400, description = "Invalid upload", body = crate::api::error::ErrorResponse),
        (status = 413, description = "Request body too large", body = crate::api::error::ErrorResponse)
    ),
    tag = "convert"
)]
pub async fn convert_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    // Use a result to capture errors so we can consume the multipart stream if needed
    let result: Result<ConversionJob, AppError> = async {
        let mut job = ConversionJob::new();
        let mut saw_file_part = false;

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(IMAGES_FIELD) {
                continue;
            }
            // Plain form values under the same name are not file parts
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };
            saw_file_part = true;

            let rules = state.converter.rules();
            validation::validate_filename(&filename, rules)?;

            let (data, size) = read_capped(&mut field, rules.max_file_size).await?;
            validation::validate_file_size(&filename, size, rules)?;

            let decoded = state
                .converter
                .decode(UploadedImage::new(filename, data))
                .await?;
            job.push(decoded);
        }

        if !saw_file_part {
            return Err(ConversionError::MissingFilePart.into());
        }
        Ok(job)
    }
    .await;

    let job = match result {
        Ok(job) => job,
        Err(e) => {
            // Drain what the client is still sending to avoid a TCP reset
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e);
        }
    };

    let artifact = state.converter.convert(job).await?;
    let (object, _deletion) = state.converter.deliver(&artifact).await?;

    let body = Body::from_stream(ReaderStream::new(object.file));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())
        .header(header::CONTENT_LENGTH, object.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Reads a field, keeping at most `limit` bytes but measuring all of it
async fn read_capped(field: &mut Field<'_>, limit: usize) -> Result<(Vec<u8>, usize), AppError> {
    let mut data = Vec::new();
    let mut size = 0usize;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len();
        if size <= limit {
            data.extend_from_slice(&chunk);
        }
    }

    Ok((data, size))
}
