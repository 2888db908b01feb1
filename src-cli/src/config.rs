use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use aadhaar_ocr::TesseractConfig;
use aadhaar_verify::VerifyOptions;

pub const ENV_TESSERACT: &str = "AADHAAR_MASK_TESSERACT";
pub const ENV_TESSDATA: &str = "AADHAAR_MASK_TESSDATA";
pub const ENV_LANG: &str = "AADHAAR_MASK_LANG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    // ============ OCR ============
    pub tesseract: TesseractConfig,

    // ============ Output ============
    /// Directory for masked images, defaults to the input's directory
    pub output_dir: Option<String>,
    /// Write `<output>.audit.json` next to the masked image
    pub write_audit: bool,

    // ============ Masking ============
    /// RGB fill colour
    pub mask_color: [u8; 3],
    /// Mask every fragment of the number, not just the first probe hit
    pub mask_all_fragments: bool,

    // ============ Verification ============
    pub verify: VerifyOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract: TesseractConfig::default(),
            output_dir: None,
            write_audit: true,
            mask_color: [0, 0, 0],
            mask_all_fragments: false,
            verify: VerifyOptions::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppConfig {
    /// Apply overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup(ENV_TESSERACT) {
            self.tesseract.binary_path = Some(binary);
        }
        if let Some(tessdata) = lookup(ENV_TESSDATA) {
            self.tesseract.tessdata_path = Some(tessdata);
        }
        if let Some(lang) = lookup(ENV_LANG) {
            self.tesseract.lang = Some(lang);
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    }

    /// `<outputDir or input dir>/<stem>_masked.<ext>`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let ext = input
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "png".to_string());
        let name = format!("{}_masked.{}", stem, ext);

        match &self.output_dir {
            Some(dir) => Path::new(dir).join(name),
            None => input.with_file_name(name),
        }
    }
}

/// Load the config file, or defaults when it does not exist
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        log::warn!("[Config] {} not found, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}
