//! Shared OCR types

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, `None` on overflow
    pub fn right(&self) -> Option<u32> {
        self.x.checked_add(self.width)
    }

    /// Exclusive bottom edge, `None` on overflow
    pub fn bottom(&self) -> Option<u32> {
        self.y.checked_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle lies entirely inside a `width` x `height` grid
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        matches!(self.right(), Some(r) if r <= width) && matches!(self.bottom(), Some(b) if b <= height)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && self.right().map_or(true, |r| px < r)
            && self.bottom().map_or(true, |b| py < b)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// A word reported by the engine in word-segmentation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub rect: Rect,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            rect,
        }
    }

    /// Word text with every whitespace character removed
    pub fn stripped_text(&self) -> String {
        self.text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

/// Tesseract configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Path to the tesseract executable
    pub binary_path: Option<String>,
    /// tessdata directory, exported as `TESSDATA_PREFIX`
    pub tessdata_path: Option<String>,
    /// Language model, e.g. "eng"
    pub lang: Option<String>,
    /// Page segmentation mode (0-13)
    pub psm: Option<u8>,
    /// OCR engine mode (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn binary_or_default(&self) -> &str {
        self.binary_path.as_deref().unwrap_or("tesseract")
    }

    pub fn lang_or_default(&self) -> &str {
        self.lang.as_deref().unwrap_or("eng")
    }

    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(3)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(3)
    }
}

/// Tesseract installation status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseractStatus {
    pub installed: bool,
    pub version: Option<String>,
    pub binary_path: Option<String>,
    pub tessdata_path: Option<String>,
    pub available_langs: Vec<String>,
    pub error: Option<String>,
}

/// OCR audit information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrAuditInfo {
    /// Engine name, e.g. "tesseract"
    pub engine: String,
    pub engine_version: Option<String>,
    /// Engine parameters (JSON)
    pub engine_params: Option<String>,
    /// SHA-256 over the tessdata listing (Tesseract only)
    pub tessdata_hash: Option<String>,
}
