//! Configuration management for Argus.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Argus reads an optional `argus.toml` with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ARGUS_*` environment overrides
//! - Defaults for every section, so no file is required
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use argus::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("argus.toml")?;
//!
//! if config.ner.enabled {
//!     println!("NER endpoint: {:?}", config.ner.endpoint);
//! }
//! println!("Log level: {}", config.logging.level);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [detection]
//! min_confidence = 0.35
//! default_language = "de"
//!
//! [ner]
//! enabled = true
//! endpoint = "http://localhost:8500/predict"
//! timeout_ms = 5000
//! username = "argus"
//! password = "${ARGUS_NER_PASSWORD}"
//!
//! [patterns]
//! path = "patterns/custom_patterns.toml"
//!
//! [audit]
//! enabled = true
//! log_path = "/var/log/argus/audit.jsonl"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ArgusConfig, AssetConfig, AuditConfig, DetectionConfig, LoggingConfig, NerConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
