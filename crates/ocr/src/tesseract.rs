//! Tesseract OCR engine (CLI wrapper)

use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tempfile::NamedTempFile;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::{OcrAuditInfo, RecognizedWord, Rect, TesseractConfig, TesseractStatus};

/// Tesseract OCR engine.
///
/// Every call writes the image to its own temp file and spawns a separate
/// `tesseract` process, so one instance can serve concurrent callers.
pub struct TesseractEngine {
    config: TesseractConfig,
    version: Option<String>,
}

impl TesseractEngine {
    /// Create the engine, checking that the binary runs
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let version = get_tesseract_version(config.binary_or_default())?;

        log::info!("[Tesseract] initialised, version: {}", version);

        Ok(Self {
            config,
            version: Some(version),
        })
    }

    /// Lossless copy of `img` the CLI can read; pixel grid is unchanged
    fn write_input(&self, img: &DynamicImage) -> Result<NamedTempFile, OcrError> {
        let file = tempfile::Builder::new()
            .prefix("aadhaar-ocr-")
            .suffix(".png")
            .tempfile()?;

        img.save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(format!("failed to write temp image: {}", e)))?;

        Ok(file)
    }

    fn run(&self, image_path: &Path, output_config: Option<&str>) -> Result<String, OcrError> {
        let binary = self.config.binary_or_default();
        let mut cmd = Command::new(binary);

        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(self.config.lang_or_default())
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string());

        if let Some(output_config) = output_config {
            cmd.arg(output_config);
        }

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }

        log::debug!(
            "[Tesseract] exec: {} {} -l {} --psm {} --oem {} {}",
            binary,
            image_path.display(),
            self.config.lang_or_default(),
            self.config.psm_or_default(),
            self.config.oem_or_default(),
            output_config.unwrap_or("")
        );

        let output = cmd
            .output()
            .map_err(|e| OcrError::EngineUnavailable(format!("failed to run {}: {}", binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_text(&self, img: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let input = self.write_input(img)?;
        let text = self.run(input.path(), None)?;

        log::info!(
            "[Tesseract] text recognition done in {} ms, {} chars",
            start.elapsed().as_millis(),
            text.chars().count()
        );
        Ok(text)
    }

    fn recognize_words(&self, img: &DynamicImage) -> Result<Vec<RecognizedWord>, OcrError> {
        let start = Instant::now();
        let input = self.write_input(img)?;
        let tsv = self.run(input.path(), Some("tsv"))?;
        let words = parse_tesseract_tsv(&tsv)?;

        log::info!(
            "[Tesseract] word recognition done in {} ms, {} words",
            start.elapsed().as_millis(),
            words.len()
        );
        Ok(words)
    }

    fn audit_info(&self) -> OcrAuditInfo {
        let params = serde_json::json!({
            "lang": self.config.lang_or_default(),
            "psm": self.config.psm_or_default(),
            "oem": self.config.oem_or_default(),
        });

        OcrAuditInfo {
            engine: "tesseract".to_string(),
            engine_version: self.version.clone(),
            engine_params: Some(params.to_string()),
            tessdata_hash: self
                .config
                .tessdata_path
                .as_deref()
                .and_then(|p| compute_tessdata_hash(p).ok()),
        }
    }
}

/// Parse Tesseract TSV output.
///
/// TSV columns:
/// level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
///
/// Returns word-level (level 5) entries in engine order with pixel rectangles.
pub fn parse_tesseract_tsv(tsv: &str) -> Result<Vec<RecognizedWord>, OcrError> {
    let mut words = Vec::new();

    // skip header
    for (line_no, line) in tsv.lines().enumerate().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }

        if cols[0].trim() != "5" {
            continue;
        }

        let text = cols[11].trim();
        let conf: f32 = parse_col(cols[10], line_no)?;
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let rect = Rect::new(
            parse_col(cols[6], line_no)?,
            parse_col(cols[7], line_no)?,
            parse_col(cols[8], line_no)?,
            parse_col(cols[9], line_no)?,
        );

        words.push(RecognizedWord {
            text: text.to_string(),
            // Tesseract confidence is 0-100
            confidence: conf / 100.0,
            rect,
        });
    }

    Ok(words)
}

fn parse_col<T: std::str::FromStr>(value: &str, line_no: usize) -> Result<T, OcrError> {
    value
        .trim()
        .parse()
        .map_err(|_| OcrError::Parse(format!("bad TSV value {:?} on line {}", value, line_no + 1)))
}

/// Get the Tesseract version
pub fn get_tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("cannot run {}: {}", binary_path, e)))?;

    if !output.status.success() {
        return Err(OcrError::EngineUnavailable(format!(
            "{} --version failed",
            binary_path
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(parse_version(&format!("{}{}", stdout, stderr)))
}

/// "tesseract 5.3.0" or "tesseract v5.3.0", first matching line
fn parse_version(banner: &str) -> String {
    banner
        .lines()
        .filter(|line| line.contains("tesseract"))
        .find_map(|line| line.split_whitespace().nth(1))
        .map(|v| v.trim_start_matches('v').to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// List the languages available to Tesseract
pub fn get_tesseract_langs(
    binary_path: &str,
    tessdata_path: Option<&str>,
) -> Result<Vec<String>, OcrError> {
    let mut cmd = Command::new(binary_path);
    cmd.arg("--list-langs");

    if let Some(path) = tessdata_path {
        cmd.env("TESSDATA_PREFIX", path);
    }

    let output = cmd
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("cannot run {}: {}", binary_path, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(parse_langs(&format!("{}{}", stdout, stderr)))
}

fn parse_langs(listing: &str) -> Vec<String> {
    let mut langs = Vec::new();
    let mut found_list = false;

    for line in listing.lines() {
        let line = line.trim();
        if line.contains("List of available languages") {
            found_list = true;
            continue;
        }
        if found_list && !line.is_empty() && !line.contains(':') {
            langs.push(line.to_string());
        }
    }

    langs
}

/// Detect the Tesseract installation
pub fn detect_tesseract_status(config: &TesseractConfig) -> TesseractStatus {
    let binary_path = config.binary_or_default();

    match get_tesseract_version(binary_path) {
        Ok(version) => {
            let langs = get_tesseract_langs(binary_path, config.tessdata_path.as_deref())
                .unwrap_or_default();
            let tessdata = config
                .tessdata_path
                .clone()
                .or_else(find_tessdata_path);

            TesseractStatus {
                installed: true,
                version: Some(version),
                binary_path: which_tesseract(binary_path).or_else(|| Some(binary_path.to_string())),
                tessdata_path: tessdata,
                available_langs: langs,
                error: None,
            }
        }
        Err(e) => TesseractStatus {
            installed: false,
            version: None,
            binary_path: None,
            tessdata_path: None,
            available_langs: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

/// Full path of the tesseract executable
fn which_tesseract(binary: &str) -> Option<String> {
    if Path::new(binary).is_absolute() {
        return Some(binary.to_string());
    }

    #[cfg(target_os = "windows")]
    let locator = "where";
    #[cfg(not(target_os = "windows"))]
    let locator = "which";

    Command::new(locator)
        .arg(binary)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
}

/// Locate a tessdata directory
fn find_tessdata_path() -> Option<String> {
    if let Ok(path) = std::env::var("TESSDATA_PREFIX") {
        if Path::new(&path).exists() {
            return Some(path);
        }
    }

    #[cfg(target_os = "windows")]
    let common_paths: Vec<std::path::PathBuf> = ["ProgramFiles", "ProgramFiles(x86)"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|dir| Path::new(&dir).join("Tesseract-OCR").join("tessdata"))
        .collect();

    #[cfg(not(target_os = "windows"))]
    let common_paths: Vec<std::path::PathBuf> = vec![
        Path::new("/usr/share/tesseract-ocr/5/tessdata").to_path_buf(),
        Path::new("/usr/share/tesseract-ocr/4.00/tessdata").to_path_buf(),
        Path::new("/usr/share/tessdata").to_path_buf(),
        Path::new("/usr/local/share/tessdata").to_path_buf(),
        Path::new("/opt/homebrew/share/tessdata").to_path_buf(),
    ];

    common_paths
        .into_iter()
        .find(|p| p.exists())
        .map(|p| p.to_string_lossy().to_string())
}

/// SHA-256 over the names and sizes of the installed `.traineddata` files
fn compute_tessdata_hash(tessdata_path: &str) -> Result<String, OcrError> {
    let path = Path::new(tessdata_path);

    let mut entries: Vec<(String, u64)> = std::fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "traineddata")
                .unwrap_or(false)
        })
        .map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let size = e.metadata().map(|m| m.len()).unwrap_or(0);
            (name, size)
        })
        .collect();

    // read_dir order is platform dependent
    entries.sort();

    let mut hasher = Sha256::new();
    for (name, size) in entries {
        hasher.update(name.as_bytes());
        hasher.update(size.to_le_bytes());
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv_word_level() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
4\t1\t1\t1\t1\t0\t50\t80\t300\t22\t-1\t
5\t1\t1\t1\t1\t1\t50\t80\t70\t22\t95.5\tAadhaar:
5\t1\t1\t1\t1\t2\t130\t80\t140\t22\t92.3\t123456789
5\t1\t1\t1\t2\t1\t50\t120\t60\t20\t-1\t
";
        let words = parse_tesseract_tsv(tsv).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Aadhaar:");
        assert_eq!(words[1].text, "123456789");
        assert_eq!(words[1].rect, Rect::new(130, 80, 140, 22));
        assert!((words[0].confidence - 0.955).abs() < 0.001);
    }

    #[test]
    fn test_parse_tsv_rejects_garbage_geometry() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t1\t1\t1\t1\tx\t80\t70\t22\t95\tword
";
        assert!(matches!(parse_tesseract_tsv(tsv), Err(OcrError::Parse(_))));
    }

    #[test]
    fn test_parse_tsv_skips_short_rows() {
        let tsv = "level\tleft\n5\t1\n";
        assert!(parse_tesseract_tsv(tsv).unwrap().is_empty());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("tesseract 5.3.0\n leptonica-1.82.0"), "5.3.0");
        assert_eq!(parse_version("tesseract v4.1.1"), "4.1.1");
        assert_eq!(parse_version("something else"), "unknown");
    }

    #[test]
    fn test_parse_langs() {
        let listing = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nhin\nosd\n";
        assert_eq!(parse_langs(listing), vec!["eng", "hin", "osd"]);
    }

    #[test]
    fn test_tessdata_hash_is_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eng.traineddata"), b"abc").unwrap();
        std::fs::write(dir.path().join("hin.traineddata"), b"defg").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let first = compute_tessdata_hash(dir.path().to_str().unwrap()).unwrap();
        let second = compute_tessdata_hash(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        std::fs::write(dir.path().join("notes.txt"), b"changed, still ignored").unwrap();
        assert_eq!(compute_tessdata_hash(dir.path().to_str().unwrap()).unwrap(), first);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let config = TesseractConfig {
            binary_path: Some("/nonexistent/tesseract-binary".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TesseractEngine::new(config.clone()),
            Err(OcrError::EngineUnavailable(_))
        ));
        let status = detect_tesseract_status(&config);
        assert!(!status.installed);
        assert!(status.error.is_some());
    }
}
