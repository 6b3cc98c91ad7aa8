#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rust_pdf_converter::config::ConverterConfig;
use rust_pdf_converter::services::conversion_service::ConversionService;
use rust_pdf_converter::services::storage::LocalStorageService;
use rust_pdf_converter::{AppState, create_app};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const BOUNDARY: &str = "----converter-test-boundary";
pub const ALLOWED_ORIGIN: &str = "https://converter-green-xi.vercel.app";

pub struct TestApp {
    pub app: Router,
    pub config: ConverterConfig,
    _scratch: TempDir,
}

impl TestApp {
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.output_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

pub fn setup_app() -> TestApp {
    setup_app_with(|_| {})
}

pub fn setup_app_with(customize: impl FnOnce(&mut ConverterConfig)) -> TestApp {
    let scratch = tempfile::tempdir().unwrap();
    let mut config = ConverterConfig {
        upload_dir: scratch.path().join("uploads"),
        output_dir: scratch.path().join("output"),
        ..ConverterConfig::default()
    };
    customize(&mut config);
    std::fs::create_dir_all(&config.upload_dir).unwrap();
    std::fs::create_dir_all(&config.output_dir).unwrap();

    let storage = Arc::new(LocalStorageService::new(&config.output_dir));
    let state = AppState {
        converter: Arc::new(ConversionService::new(storage, &config)),
        config: config.clone(),
    };

    TestApp {
        app: create_app(state),
        config,
        _scratch: scratch,
    }
}

pub fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&solid_image(width, height), ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&solid_image(width, height), ImageFormat::Jpeg)
}

/// One part of a multipart form
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn image(filename: &str, data: Vec<u8>) -> Self {
        Self {
            name: "images".to_string(),
            filename: Some(filename.to_string()),
            data,
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match &part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn convert_request(parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn error_message(response: Response<Body>) -> String {
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    json["error"].as_str().unwrap().to_string()
}

/// Filename from a `Content-Disposition: attachment; filename="..."` header
pub fn attachment_filename(response: &Response<Body>) -> String {
    let value = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(value.starts_with("attachment;"), "not an attachment: {}", value);
    value
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap()
        .to_string()
}

pub fn is_artifact_name(name: &str) -> bool {
    name.strip_prefix("converted_")
        .and_then(|rest| rest.strip_suffix(".pdf"))
        .map(|hex| hex.len() == 32 && hex.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
        .unwrap_or(false)
}

/// Width and height of each page, in page order
pub fn page_sizes(pdf: &[u8]) -> Vec<(i64, i64)> {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            (
                media_box[2].as_i64().unwrap(),
                media_box[3].as_i64().unwrap(),
            )
        })
        .collect()
}
