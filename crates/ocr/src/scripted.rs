//! In-memory engine returning canned results

use std::sync::atomic::{AtomicUsize, Ordering};

use image::DynamicImage;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::{OcrAuditInfo, RecognizedWord};

/// Engine with fixed answers, for tests and dry runs.
///
/// `None` for either answer makes that call fail with `OcrError::Recognition`.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    text: Option<String>,
    words: Option<Vec<RecognizedWord>>,
    text_calls: AtomicUsize,
    word_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(text: impl Into<String>, words: Vec<RecognizedWord>) -> Self {
        Self {
            text: Some(text.into()),
            words: Some(words),
            ..Default::default()
        }
    }

    /// Both calls fail
    pub fn failing() -> Self {
        Self::default()
    }

    /// Text succeeds, word segmentation fails
    pub fn failing_words(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn word_calls(&self) -> usize {
        self.word_calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize_text(&self, _img: &DynamicImage) -> Result<String, OcrError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| OcrError::Recognition("scripted text failure".to_string()))
    }

    fn recognize_words(&self, _img: &DynamicImage) -> Result<Vec<RecognizedWord>, OcrError> {
        self.word_calls.fetch_add(1, Ordering::SeqCst);
        self.words
            .clone()
            .ok_or_else(|| OcrError::Recognition("scripted word failure".to_string()))
    }

    fn audit_info(&self) -> OcrAuditInfo {
        OcrAuditInfo {
            engine: "scripted".to_string(),
            engine_version: None,
            engine_params: None,
            tessdata_hash: None,
        }
    }
}
