//! Audit records for masked images.
//!
//! Records only carry the masked form of the number.

use std::fs;
use std::path::{Path, PathBuf};

use aadhaar_core::{Rect, Redaction};
use aadhaar_ocr::OcrAuditInfo;
use aadhaar_verify::VerifyResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to write audit record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode audit record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub input_path: String,
    pub output_path: String,
    pub id_number: String,
    pub regions: Vec<Rect>,
    pub image_width: u32,
    pub image_height: u32,
    pub output_sha256: String,
    pub engine: OcrAuditInfo,
    pub verify: Option<VerifyResult>,
}

impl AuditRecord {
    pub fn new(
        input: &Path,
        output: &Path,
        redaction: &Redaction,
        encoded_output: &[u8],
        engine: OcrAuditInfo,
        verify: Option<VerifyResult>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            input_path: input.to_string_lossy().to_string(),
            output_path: output.to_string_lossy().to_string(),
            id_number: redaction.id_number.masked(),
            regions: redaction.regions.clone(),
            image_width: redaction.image.width(),
            image_height: redaction.image.height(),
            output_sha256: sha256_hex(encoded_output),
            engine,
            verify,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), AuditError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        log::info!("[Audit] wrote {}", path.display());
        Ok(())
    }
}

/// `<output>.audit.json`
pub fn audit_path_for(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".audit.json");
    PathBuf::from(name)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
