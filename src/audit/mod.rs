//! Audit trail for detection runs
//!
//! One JSON line per scanned document: when it was scanned, what was found,
//! at which confidence, and how long the run took. Entity text never reaches
//! the trail; values are SHA-256 hashed so repeated findings can be
//! correlated without re-exposing the data they describe.

use crate::config::AuditConfig;
use crate::domain::{ArgusError, DetectionResult, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// One audit record, serialized as a single JSON line
#[derive(Debug, Serialize)]
struct AuditRecord {
    timestamp: String,
    document_id: String,
    document_type: String,
    language: String,
    mode: String,
    duration_ms: u64,
    entity_count: usize,
    flagged_count: usize,
    entities: Vec<AuditEntity>,
}

/// One detected entity within a record
#[derive(Debug, Serialize)]
struct AuditEntity {
    entity_type: String,
    confidence: f64,
    /// SHA-256 hash of the entity text (never the plaintext)
    value_hash: String,
}

/// Append-only audit logger
///
/// A disabled logger accepts records and discards them, so call sites don't
/// branch on configuration.
pub struct AuditLogger {
    log_path: PathBuf,
    enabled: bool,
}

impl AuditLogger {
    /// Build a logger from configuration, creating the log directory when
    /// auditing is enabled
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        if config.enabled {
            if let Some(parent) = config.log_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ArgusError::Audit(format!(
                            "cannot create audit log directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }
        Ok(Self {
            log_path: config.log_path.clone(),
            enabled: config.enabled,
        })
    }

    /// Append one record for a completed detection run
    pub fn log_detection(&self, result: &DetectionResult) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let record = AuditRecord {
            timestamp: Utc::now().to_rfc3339(),
            document_id: result.metadata.document_id.clone(),
            document_type: result.classification.document_type.label().to_string(),
            language: result.classification.language.code().to_string(),
            mode: result.metadata.mode.to_string(),
            duration_ms: result.metadata.total_duration_ms,
            entity_count: result.entities.len(),
            flagged_count: result.metadata.flagged_count,
            entities: result
                .entities
                .iter()
                .map(|entity| AuditEntity {
                    entity_type: entity.entity_type.label().to_string(),
                    confidence: entity.confidence,
                    value_hash: hash_value(&entity.text),
                })
                .collect(),
        };

        self.append(&record)
    }

    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                ArgusError::Audit(format!(
                    "cannot open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        let line = serde_json::to_string(record)
            .map_err(|e| ArgusError::Audit(format!("cannot serialize audit record: {e}")))?;
        writeln!(file, "{line}")
            .map_err(|e| ArgusError::Audit(format!("cannot write audit record: {e}")))?;
        Ok(())
    }
}

/// SHA-256 hex digest of an entity value
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}
