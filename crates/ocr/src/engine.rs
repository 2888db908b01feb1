//! OCR engine trait

use crate::error::OcrError;
use crate::types::{OcrAuditInfo, RecognizedWord};
use image::DynamicImage;

/// Text recognition boundary used by the redaction pipeline.
///
/// Word rectangles are in the pixel grid of the image passed in. Callers that
/// mask an image must recognize that same image, not a resized copy.
///
/// Implementations are shared across threads, so every call must be
/// independent of the others.
pub trait OcrEngine: Send + Sync {
    /// Full-page recognition, plain text only
    fn recognize_text(&self, img: &DynamicImage) -> Result<String, OcrError>;

    /// Word-segmentation recognition, one entry per word in engine order
    fn recognize_words(&self, img: &DynamicImage) -> Result<Vec<RecognizedWord>, OcrError>;

    /// Audit information
    fn audit_info(&self) -> OcrAuditInfo;
}
