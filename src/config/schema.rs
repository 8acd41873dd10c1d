//! Configuration schema types

use crate::config::SecretString;
use crate::domain::Language;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Argus configuration
///
/// This is the root structure that maps to the `argus.toml` file. Every
/// section has defaults, so an empty file (or no file at all) yields a
/// working regex-only configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgusConfig {
    /// Detection pipeline settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Neural NER sidecar settings
    #[serde(default)]
    pub ner: NerConfig,

    /// Override for the embedded PII pattern asset
    #[serde(default)]
    pub patterns: AssetConfig,

    /// Override for the embedded deny list asset
    #[serde(default)]
    pub deny_list: AssetConfig,

    /// Override for the embedded document rules asset
    #[serde(default)]
    pub rules: AssetConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArgusConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.detection.validate()?;
        self.ner.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Detection pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Reporting floor: scan output omits entities below this confidence
    #[serde(default)]
    pub min_confidence: f64,

    /// Language hint applied to documents that carry none
    #[serde(default)]
    pub default_language: Option<Language>,

    /// Concurrent documents during batch scans (0 = available parallelism)
    #[serde(default)]
    pub parallelism: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            default_language: None,
            parallelism: 0,
        }
    }
}

impl DetectionConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "detection.min_confidence must be between 0.0 and 1.0, got {}",
                self.min_confidence
            ));
        }
        if self.parallelism > 256 {
            return Err(format!(
                "detection.parallelism must be <= 256, got {}",
                self.parallelism
            ));
        }
        Ok(())
    }
}

/// Neural NER sidecar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// Whether the pipeline should call the inference service at all
    #[serde(default)]
    pub enabled: bool,

    /// Prediction endpoint URL, e.g. `http://localhost:8500/predict`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_ner_timeout_ms")]
    pub timeout_ms: u64,

    /// Username for Basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for Basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_ms: default_ner_timeout_ms(),
            username: None,
            password: None,
        }
    }
}

impl NerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled {
            let Some(endpoint) = &self.endpoint else {
                return Err("ner.endpoint must be set when ner.enabled = true".to_string());
            };
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("ner.endpoint must start with http:// or https://".to_string());
            }
        }
        if self.timeout_ms == 0 {
            return Err("ner.timeout_ms must be > 0".to_string());
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(
                "ner.username and ner.password must be set together or not at all".to_string(),
            );
        }
        Ok(())
    }
}

/// Optional file override for one embedded TOML asset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Path to a replacement or override file; `None` keeps the embedded one
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable the JSON-lines audit trail
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file, appended to
    #[serde(default = "default_audit_path")]
    pub log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_path(),
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output format (text or json)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files; `None` disables file logging
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_ner_timeout_ms() -> u64 {
    5_000
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("argus-audit.jsonl")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
