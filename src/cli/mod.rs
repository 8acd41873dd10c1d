//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Argus using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Argus - PII detection for business documents
#[derive(Parser, Debug)]
#[command(name = "argus")]
#[command(version, about, long_about = None)]
#[command(author = "Argus Contributors")]
pub struct Cli {
    /// Path to configuration file (default: argus.toml when present)
    #[arg(short, long, env = "ARGUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ARGUS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan documents for personal data
    Scan(commands::scan::ScanArgs),

    /// Validate the configuration file and asset overrides
    ValidateConfig(commands::validate::ValidateArgs),

    /// Create a starter configuration file and editable pattern assets
    Init(commands::init::InitArgs),
}
