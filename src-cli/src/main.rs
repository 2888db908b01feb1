use std::path::{Path, PathBuf};
use std::sync::Arc;

use aadhaar_mask::{exit_code, load_config, redact_file, save_config, AppConfig, RedactRequest};
use aadhaar_ocr::{detect_tesseract_status, TesseractEngine};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aadhaar-mask")]
#[command(version, about = "Mask the Aadhaar number printed on a scanned document image", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true, env = "AADHAAR_MASK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mask the Aadhaar number in an image
    Redact {
        /// Input image (PNG or JPEG)
        input: PathBuf,

        /// Output image (default: <input stem>_masked.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mask every fragment of the number, not only the first probe hit
        #[arg(long)]
        all_fragments: bool,

        /// Skip the re-recognition check on the masked image
        #[arg(long)]
        no_verify: bool,

        /// Do not write an audit record
        #[arg(long)]
        no_audit: bool,
    },

    /// Show the Tesseract installation status
    Status,

    /// Write a default config file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Redact {
            input,
            output,
            all_fragments,
            no_verify,
            no_audit,
        } => {
            let mut config = resolve_config(cli.config.as_deref())?;
            config.mask_all_fragments |= all_fragments;

            let engine = TesseractEngine::new(config.tesseract.clone())
                .context("tesseract is not available, see `aadhaar-mask status`")?;

            let request = RedactRequest {
                input,
                output,
                verify: !no_verify,
                audit: !no_audit,
            };
            let report = redact_file(Arc::new(engine), &config, &request)?;

            println!("Masked {} in {} region(s)", report.id_number, report.regions.len());
            println!("Saved {}", report.output.display());
            if let Some(audit) = &report.audit {
                println!("Audit {}", audit.display());
            }
            Ok(())
        }
        Commands::Status => {
            let config = resolve_config(cli.config.as_deref())?;
            let status = detect_tesseract_status(&config.tesseract);
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::InitConfig { path } => {
            save_config(&path, &AppConfig::default())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            load_config(path).with_context(|| format!("failed to read config {}", path.display()))?
        }
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}
