//! Post-redaction verification checks.
//!
//! Runs recognition again on the masked image and reports whether the number
//! is still readable. A recognition failure is returned as an error so that a
//! broken engine never passes as a clean result.

use aadhaar_core::extract::find_candidates;
use aadhaar_core::{locate, IdNumber};
use aadhaar_ocr::{OcrEngine, OcrError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Full-page text must no longer contain the number anywhere
    pub text_search: bool,
    /// Word boxes must no longer match either probe
    pub word_search: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            text_search: true,
            word_search: false,
        }
    }
}

impl VerifyOptions {
    pub fn is_enabled(&self) -> bool {
        self.text_search || self.word_search
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub ok: bool,
    pub warnings: Vec<String>,
}

pub fn verify_redaction(
    engine: &dyn OcrEngine,
    redacted: &DynamicImage,
    id_number: &IdNumber,
    options: &VerifyOptions,
) -> Result<VerifyResult, OcrError> {
    let mut warnings = Vec::new();

    if options.text_search {
        let text = engine.recognize_text(redacted)?;
        if find_candidates(&text).iter().any(|c| c == id_number) {
            warnings.push(format!(
                "{} is still readable in the full-page text",
                id_number.masked()
            ));
        }
    }

    if options.word_search {
        let words = engine.recognize_words(redacted)?;
        if let Some(rect) = locate(id_number, &words) {
            warnings.push(format!("a word matching {} remains at {}", id_number.masked(), rect));
        }
    }

    for warning in &warnings {
        log::warn!("[Verify] {}", warning);
    }

    Ok(VerifyResult {
        ok: warnings.is_empty(),
        warnings,
    })
}
