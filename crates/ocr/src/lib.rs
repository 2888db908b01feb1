//! Text recognition for document images.
//!
//! The redaction pipeline only depends on the [`OcrEngine`] trait. The
//! production engine wraps the Tesseract CLI; the `test-support` feature adds
//! an in-memory engine with canned answers.

mod engine;
mod error;
mod tesseract;
mod types;

#[cfg(any(test, feature = "test-support"))]
mod scripted;

pub use engine::OcrEngine;
pub use error::OcrError;
pub use tesseract::{
    detect_tesseract_status, get_tesseract_langs, get_tesseract_version, parse_tesseract_tsv,
    TesseractEngine,
};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedEngine;
