pub mod cleanup;
pub mod conversion_service;
pub mod image_decoder;
pub mod pdf_builder;
pub mod storage;
pub mod worker;
