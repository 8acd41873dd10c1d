//! Detection result models

use super::document::DocumentClassification;
use super::entity::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How candidates were generated for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// Regex and neural NER both contributed
    Hybrid,
    /// No NER backend configured, regex only
    RegexOnly,
    /// NER was configured but failed or timed out, degraded to regex
    Fallback,
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Hybrid => "hybrid",
            Self::RegexOnly => "regex-only",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// Per-pass accounting recorded by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassStats {
    /// Pass name, e.g. `normalize` or `validate`
    pub pass_name: String,
    /// Entities added by this pass
    pub entities_added: usize,
    /// Entities whose confidence or metadata changed
    pub entities_modified: usize,
    /// Entities removed by this pass
    pub entities_removed: usize,
    /// Wall-clock duration of the pass
    pub duration_ms: u64,
}

impl PassStats {
    /// Stats for a pass that left the entity stream untouched
    pub fn unchanged(pass_name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            pass_name: pass_name.into(),
            entities_added: 0,
            entities_modified: 0,
            entities_removed: 0,
            duration_ms,
        }
    }
}

/// Run-level metadata attached to every detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionMetadata {
    /// Identifier of the scanned document
    pub document_id: String,
    /// Candidate generation mode for this run
    pub mode: DetectionMode,
    /// Total wall-clock duration across all passes
    pub total_duration_ms: u64,
    /// Per-pass accounting, in execution order
    pub pass_results: Vec<PassStats>,
    /// Entity counts by type label
    pub entity_counts: BTreeMap<String, usize>,
    /// Number of entities flagged for review
    pub flagged_count: usize,
}

/// Final output of the detection pipeline for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detected entities in original-document coordinates, sorted by start
    pub entities: Vec<Entity>,
    /// Document classification computed during the run
    pub classification: DocumentClassification,
    /// Run metadata
    pub metadata: DetectionMetadata,
}

impl DetectionResult {
    /// True when at least one entity survived the pipeline
    pub fn has_entities(&self) -> bool {
        !self.entities.is_empty()
    }

    /// Count entities of one type label
    pub fn count_of(&self, label: &str) -> usize {
        self.metadata.entity_counts.get(label).copied().unwrap_or(0)
    }
}

/// Outcome of a format validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the candidate passed structural and checksum rules
    pub is_valid: bool,
    /// Lattice confidence level for this outcome
    pub confidence: f64,
    /// Explanation for failures, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    /// A passing validation at the given lattice level
    pub fn valid(confidence: f64) -> Self {
        Self {
            is_valid: true,
            confidence,
            reason: None,
        }
    }

    /// A failing validation with an explanation
    pub fn invalid(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_mode_wire_format() {
        assert_eq!(
            serde_json::to_string(&DetectionMode::RegexOnly).unwrap(),
            "\"regex-only\""
        );
        assert_eq!(DetectionMode::Fallback.to_string(), "fallback");
    }

    #[test]
    fn test_pass_stats_unchanged() {
        let stats = PassStats::unchanged("normalize", 3);
        assert_eq!(stats.pass_name, "normalize");
        assert_eq!(stats.entities_added, 0);
        assert_eq!(stats.duration_ms, 3);
    }

    #[test]
    fn test_validation_result_constructors() {
        let ok = ValidationResult::valid(0.85);
        assert!(ok.is_valid);
        assert!(ok.reason.is_none());

        let bad = ValidationResult::invalid(0.1, "checksum mismatch");
        assert!(!bad.is_valid);
        assert_eq!(bad.confidence, 0.1);
        assert_eq!(bad.reason.as_deref(), Some("checksum mismatch"));
    }
}
