//! OCR error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("image processing failed: {0}")]
    ImageProcess(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("malformed engine output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
