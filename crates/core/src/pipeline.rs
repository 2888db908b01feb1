//! End-to-end redaction: recognize, extract, locate, mask.
//!
//! The pipeline is synchronous and keeps no state between runs. Every failure
//! is terminal for the run; callers decide whether to try again.

use std::time::Instant;

use aadhaar_ocr::{OcrEngine, Rect};
use image::DynamicImage;

use crate::extract::extract_id_number;
use crate::id_number::IdNumber;
use crate::locate::{locate, locate_all};
use crate::redact::Redactor;
use crate::{CoreError, Result};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RecognitionError,
    NumberNotFound,
    RegionNotFound,
    InvalidRectangle,
    /// Image decode/encode or file I/O. `run` never reads or writes files,
    /// so this only shows up when callers classify codec errors themselves.
    Codec,
}

impl FailureKind {
    pub fn of(err: &CoreError) -> Self {
        match err {
            CoreError::NumberNotFound => FailureKind::NumberNotFound,
            CoreError::RegionNotFound => FailureKind::RegionNotFound,
            CoreError::InvalidRectangle { .. } | CoreError::EmptyMask => {
                FailureKind::InvalidRectangle
            }
            CoreError::Recognition(_) => FailureKind::RecognitionError,
            CoreError::Codec(_) | CoreError::Io(_) => FailureKind::Codec,
        }
    }
}

/// Pipeline states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Recognizing,
    Extracting,
    Locating,
    Masking,
    Done,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Mask every word holding a fragment of the number instead of the
    /// first probe hit only
    pub mask_all_fragments: bool,
}

/// Successful run
#[derive(Debug, Clone)]
pub struct Redaction {
    pub image: DynamicImage,
    pub id_number: IdNumber,
    pub regions: Vec<Rect>,
}

pub struct Pipeline<'a> {
    engine: &'a dyn OcrEngine,
    redactor: Redactor,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(engine: &'a dyn OcrEngine) -> Self {
        Self {
            engine,
            redactor: Redactor::default(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self, image: &DynamicImage) -> Result<Redaction> {
        self.run_with_observer(image, |_| {})
    }

    /// Run and report every state transition to `observer`
    pub fn run_with_observer<F>(&self, image: &DynamicImage, mut observer: F) -> Result<Redaction>
    where
        F: FnMut(PipelineState),
    {
        let start = Instant::now();
        let mut enter = |state: PipelineState| {
            log::debug!("[Pipeline] -> {:?}", state);
            observer(state);
        };

        let result = self.execute(image, &mut enter);
        match &result {
            Ok(redaction) => {
                enter(PipelineState::Done);
                log::info!(
                    "[Pipeline] masked {} in {} region(s), {} ms",
                    redaction.id_number.masked(),
                    redaction.regions.len(),
                    start.elapsed().as_millis()
                );
            }
            Err(err) => {
                enter(PipelineState::Failed(FailureKind::of(err)));
                log::info!("[Pipeline] stopped: {} ({} ms)", err, start.elapsed().as_millis());
            }
        }
        result
    }

    fn execute(
        &self,
        image: &DynamicImage,
        enter: &mut dyn FnMut(PipelineState),
    ) -> Result<Redaction> {
        enter(PipelineState::Recognizing);
        let text = self.engine.recognize_text(image)?;

        enter(PipelineState::Extracting);
        let id_number = extract_id_number(&text).ok_or(CoreError::NumberNotFound)?;
        log::info!("[Pipeline] extracted {}", id_number.masked());

        enter(PipelineState::Locating);
        let words = self.engine.recognize_words(image)?;
        let regions = if self.options.mask_all_fragments {
            locate_all(&id_number, &words)
        } else {
            locate(&id_number, &words).into_iter().collect()
        };
        if regions.is_empty() {
            log::info!("[Pipeline] no probe matched among {} words", words.len());
            return Err(CoreError::RegionNotFound);
        }

        enter(PipelineState::Masking);
        let image = self.redactor.redact_all(image, &regions)?;

        Ok(Redaction {
            image,
            id_number,
            regions,
        })
    }
}
