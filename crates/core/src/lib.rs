//! Aadhaar number detection and redaction on document images.
//!
//! [`Pipeline`] ties the pieces together: full-page OCR, pattern extraction,
//! word-level localisation and opaque masking.

pub mod codec;
pub mod extract;
pub mod id_number;
pub mod locate;
pub mod pipeline;
pub mod redact;

pub use aadhaar_ocr::{OcrEngine, OcrError, RecognizedWord, Rect};
pub use extract::extract_id_number;
pub use id_number::IdNumber;
pub use locate::{locate, locate_all};
pub use pipeline::{FailureKind, Pipeline, PipelineOptions, PipelineState, Redaction};
pub use redact::Redactor;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("recognition failed: {0}")]
    Recognition(#[from] OcrError),
    #[error("no Aadhaar number found in recognized text")]
    NumberNotFound,
    #[error("Aadhaar number found but its region could not be located")]
    RegionNotFound,
    #[error("rectangle {rect} is outside the {image_width}x{image_height} image")]
    InvalidRectangle {
        rect: Rect,
        image_width: u32,
        image_height: u32,
    },
    #[error("no rectangles to mask")]
    EmptyMask,
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Normal negative outcomes, as opposed to faults
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NumberNotFound | CoreError::RegionNotFound)
    }
}
