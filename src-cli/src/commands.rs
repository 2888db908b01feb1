//! Command implementations behind the CLI

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aadhaar_core::{codec, CoreError, OcrEngine, PipelineOptions, Rect, Redactor};
use aadhaar_verify::{verify_redaction, VerifyResult};
use anyhow::{Context, Result};

use crate::audit::{audit_path_for, AuditRecord};
use crate::config::AppConfig;
use crate::worker::RedactionWorker;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("refusing to overwrite the input image {0}")]
    OutputIsInput(PathBuf),
    #[error("masked image still exposes the number: {}", .0.join("; "))]
    VerificationFailed(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RedactRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub verify: bool,
    pub audit: bool,
}

#[derive(Debug, Clone)]
pub struct RedactReport {
    pub output: PathBuf,
    pub audit: Option<PathBuf>,
    /// Masked form only
    pub id_number: String,
    pub regions: Vec<Rect>,
    pub verify: Option<VerifyResult>,
}

/// Load, mask, verify, save and audit one image
pub fn redact_file(
    engine: Arc<dyn OcrEngine>,
    config: &AppConfig,
    request: &RedactRequest,
) -> Result<RedactReport> {
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| config.output_path_for(&request.input));
    if same_file(&request.input, &output) {
        return Err(CommandError::OutputIsInput(output).into());
    }

    let image = codec::load(&request.input)
        .with_context(|| format!("failed to load {}", request.input.display()))?;
    log::info!(
        "[Redact] loaded {} ({}x{})",
        request.input.display(),
        image.width(),
        image.height()
    );

    let options = PipelineOptions {
        mask_all_fragments: config.mask_all_fragments,
    };
    let mut worker =
        RedactionWorker::spawn(engine.clone(), Redactor::with_color(config.mask_color), options)?;
    let job = worker.submit(image)?;
    let redaction = worker.wait(job, |state| log::info!("[Redact] {:?}", state))??;

    let verify = if request.verify && config.verify.is_enabled() {
        let result = verify_redaction(
            engine.as_ref(),
            &redaction.image,
            &redaction.id_number,
            &config.verify,
        )
        .map_err(CoreError::from)
        .context("verification pass failed")?;
        if !result.ok {
            return Err(CommandError::VerificationFailed(result.warnings).into());
        }
        Some(result)
    } else {
        None
    };

    let bytes = codec::save(&redaction.image, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let audit = if request.audit && config.write_audit {
        let path = audit_path_for(&output);
        AuditRecord::new(
            &request.input,
            &output,
            &redaction,
            &bytes,
            engine.audit_info(),
            verify.clone(),
        )
        .write(&path)
        .with_context(|| format!("failed to write audit record {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(RedactReport {
        output,
        audit,
        id_number: redaction.id_number.masked(),
        regions: redaction.regions,
        verify,
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Process exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(core) = err.downcast_ref::<CoreError>() {
        return match core {
            CoreError::NumberNotFound => 2,
            CoreError::RegionNotFound => 3,
            _ => 1,
        };
    }
    match err.downcast_ref::<CommandError>() {
        Some(CommandError::VerificationFailed(_)) => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aadhaar_ocr::{RecognizedWord, ScriptedEngine};
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    const TEXT: &str = "Name: John Doe\nAadhaar: 1234 5678 9012\nDOB: ...";

    fn write_card(dir: &Path) -> PathBuf {
        let path = dir.join("card.png");
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 150, Rgb([250, 250, 250])));
        codec::save(&img, &path).unwrap();
        path
    }

    fn request(input: PathBuf) -> RedactRequest {
        RedactRequest {
            input,
            output: None,
            verify: false,
            audit: true,
        }
    }

    #[test]
    fn test_redact_file_writes_image_and_audit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        let target = Rect::new(50, 80, 140, 22);
        let engine = Arc::new(ScriptedEngine::new(
            TEXT,
            vec![RecognizedWord::new("123456789", target)],
        ));

        let report = redact_file(engine, &AppConfig::default(), &request(input.clone())).unwrap();

        assert_eq!(report.output, dir.path().join("card_masked.png"));
        assert_eq!(report.id_number, "XXXX XXXX 9012");
        assert_eq!(report.regions, vec![target]);

        let masked = codec::load(&report.output).unwrap();
        assert_eq!(masked.get_pixel(60, 90), image::Rgba([0, 0, 0, 255]));
        assert_eq!(masked.get_pixel(10, 10), image::Rgba([250, 250, 250, 255]));

        let original = codec::load(&input).unwrap();
        assert_eq!(original.get_pixel(60, 90), image::Rgba([250, 250, 250, 255]));

        let audit = report.audit.unwrap();
        assert!(audit.exists());
        assert!(!std::fs::read_to_string(audit).unwrap().contains("1234 5678 9012"));
    }

    #[test]
    fn test_number_not_found_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        let engine = Arc::new(ScriptedEngine::new("no number", Vec::new()));

        let err = redact_file(engine, &AppConfig::default(), &request(input)).unwrap_err();
        assert_eq!(exit_code(&err), 2);
        assert!(!dir.path().join("card_masked.png").exists());
    }

    #[test]
    fn test_region_not_found_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        let engine = Arc::new(ScriptedEngine::new(TEXT, Vec::new()));

        let err = redact_file(engine, &AppConfig::default(), &request(input)).unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_verification_failure_blocks_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        // the scripted engine keeps "reading" the number after masking
        let engine = Arc::new(ScriptedEngine::new(
            TEXT,
            vec![RecognizedWord::new("5678", Rect::new(100, 80, 40, 22))],
        ));
        let mut req = request(input);
        req.verify = true;

        let err = redact_file(engine, &AppConfig::default(), &req).unwrap_err();
        assert_eq!(exit_code(&err), 4);
        assert!(!dir.path().join("card_masked.png").exists());
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        let engine = Arc::new(ScriptedEngine::new(TEXT, Vec::new()));
        let mut req = request(input.clone());
        req.output = Some(input);

        let err = redact_file(engine.clone(), &AppConfig::default(), &req).unwrap_err();
        assert!(err.downcast_ref::<CommandError>().is_some());
        assert_eq!(engine.text_calls(), 0);
    }

    #[test]
    fn test_audit_disabled_in_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_card(dir.path());
        let engine = Arc::new(ScriptedEngine::new(
            TEXT,
            vec![RecognizedWord::new("5678", Rect::new(100, 80, 40, 22))],
        ));
        let config = AppConfig {
            write_audit: false,
            ..Default::default()
        };

        let report = redact_file(engine, &config, &request(input)).unwrap();
        assert!(report.audit.is_none());
        assert!(!dir.path().join("card_masked.png.audit.json").exists());
    }
}
