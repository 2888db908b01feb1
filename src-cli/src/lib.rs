//! Command-line front-end for Aadhaar number masking.
//!
//! Configuration, the background worker, audit records and the command
//! implementations live here so they can be tested without a process.

pub mod audit;
pub mod commands;
pub mod config;
pub mod worker;

pub use commands::{exit_code, redact_file, CommandError, RedactReport, RedactRequest};
pub use config::{load_config, save_config, AppConfig, ConfigError};
pub use worker::{RedactionWorker, WorkerEvent};
