//! Scan command implementation
//!
//! Reads documents from files or stdin, runs the detection pipeline over
//! them and prints one result per document. Documents are scanned
//! concurrently up to the configured parallelism; the passes within a single
//! document stay strictly sequential.

use crate::audit::AuditLogger;
use crate::cli::commands::load_configuration;
use crate::config::ArgusConfig;
use crate::core::pipeline::DetectionPipeline;
use crate::domain::{ArgusError, DetectionResult, DocumentInput, Language};
use anyhow::Context;
use clap::{Args, ValueEnum};
use futures::stream::{self, StreamExt};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Output format for scan results
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable block per document
    Text,
    /// One JSON object per document per line
    Json,
}

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Files to scan
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Read one document from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Language hint applied to every document (en, fr, de)
    #[arg(long)]
    pub language: Option<String>,

    /// Exit with code 3 when any entity is reported
    #[arg(long)]
    pub fail_on_detect: bool,
}

impl ScanArgs {
    /// Execute the scan command
    ///
    /// Returns the process exit code: 0 on success, 2 on configuration or
    /// usage errors, 3 when `--fail-on-detect` is set and entities were
    /// reported. Runtime failures bubble up as errors and exit with 1.
    pub async fn execute(
        &self,
        config_path: Option<&Path>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_configuration(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };

        let language = match &self.language {
            Some(code) => match Language::from_code(code) {
                Some(language) => Some(language),
                None => {
                    eprintln!("❌ Unknown language '{code}'. Must be one of: en, fr, de");
                    return Ok(2);
                }
            },
            None => None,
        };

        if self.paths.is_empty() && !self.stdin {
            eprintln!("❌ Nothing to scan: pass file paths or --stdin");
            return Ok(2);
        }

        let pipeline = match DetectionPipeline::from_config(&config) {
            Ok(pipeline) => pipeline.with_shutdown(shutdown_signal),
            Err(e) => {
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };
        let audit = AuditLogger::from_config(&config.audit).context("initializing audit log")?;

        let documents = self.collect_documents(language)?;
        let parallelism = effective_parallelism(&config);
        tracing::info!(
            documents = documents.len(),
            parallelism,
            "starting document scan"
        );

        let outcomes: Vec<(String, crate::domain::Result<DetectionResult>)> =
            stream::iter(documents.iter())
                .map(|document| {
                    let pipeline = &pipeline;
                    async move { (document.id.clone(), pipeline.detect(document).await) }
                })
                .buffer_unordered(parallelism)
                .collect()
                .await;

        let floor = config.detection.min_confidence;
        let mut scanned = 0usize;
        let mut reported = 0usize;
        let mut cancelled = false;

        for (document_id, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    scanned += 1;
                    audit
                        .log_detection(&result)
                        .context("writing audit record")?;
                    let shown = apply_reporting_floor(result, floor);
                    reported += shown.entities.len();
                    match self.format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string(&shown)?);
                        }
                        OutputFormat::Text => print_text_result(&shown),
                    }
                }
                Err(ArgusError::Cancelled(_)) => {
                    cancelled = true;
                }
                Err(e) => {
                    tracing::error!(document_id = %document_id, error = %e, "scan failed");
                    eprintln!("❌ Error scanning {document_id}: {e}");
                    return Ok(1);
                }
            }
        }

        if cancelled {
            eprintln!("Scan cancelled before completion");
            return Ok(1);
        }

        if self.format == OutputFormat::Text {
            println!();
            println!("✅ {scanned} document(s) scanned, {reported} entities reported");
        }

        if self.fail_on_detect && reported > 0 {
            return Ok(3);
        }
        Ok(0)
    }

    /// Gather documents from stdin and the given paths, in that order
    ///
    /// A file that cannot be decoded as UTF-8 still produces a document (with
    /// empty text) so the output keeps one record per input.
    fn collect_documents(&self, language: Option<Language>) -> anyhow::Result<Vec<DocumentInput>> {
        let mut documents = Vec::with_capacity(self.paths.len() + usize::from(self.stdin));

        if self.stdin {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading from stdin")?;
            documents.push(DocumentInput::new(text).with_id("stdin"));
        }

        for path in &self.paths {
            match read_document(path) {
                Ok(document) => documents.push(document),
                Err(ArgusError::MalformedInput(reason)) => {
                    tracing::warn!(
                        path = %path.display(),
                        reason = %reason,
                        "undecodable input, reporting an empty document"
                    );
                    documents.push(
                        DocumentInput::new(String::new()).with_id(path.display().to_string()),
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("reading {}", path.display()));
                }
            }
        }

        if let Some(language) = language {
            for document in &mut documents {
                document.language_hint = Some(language);
            }
        }
        Ok(documents)
    }
}

/// Read one document from disk, using the path as the document id
fn read_document(path: &Path) -> crate::domain::Result<DocumentInput> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        ArgusError::MalformedInput(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;
    Ok(DocumentInput::new(text).with_id(path.display().to_string()))
}

/// Drop entities below the configured reporting floor
///
/// The floor shapes the output only; pipeline internals (audit trail
/// included) always see the full result.
fn apply_reporting_floor(mut result: DetectionResult, floor: f64) -> DetectionResult {
    if floor > 0.0 {
        result.entities.retain(|entity| entity.confidence >= floor);
    }
    result
}

fn effective_parallelism(config: &ArgusConfig) -> usize {
    if config.detection.parallelism > 0 {
        config.detection.parallelism
    } else {
        std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
    }
}

fn print_text_result(result: &DetectionResult) {
    let meta = &result.metadata;
    println!(
        "{}: {} / {} | {} | {} entities | {} ms",
        meta.document_id,
        result.classification.document_type,
        result.classification.language,
        meta.mode,
        result.entities.len(),
        meta.total_duration_ms
    );
    for entity in &result.entities {
        let mut notes = Vec::new();
        if entity.metadata.contains_key("flagged_for_review") {
            notes.push("review");
        }
        if entity.metadata.contains_key("auto_anonymize") {
            notes.push("anonymize");
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!("  ({})", notes.join(", "))
        };
        println!(
            "  {:<13} {:>5.2}  [{}..{})  {}{}",
            entity.entity_type.label(),
            entity.confidence,
            entity.start,
            entity.end,
            entity.text,
            notes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DetectionSource, Entity, EntityType};

    fn sample_result(confidences: &[f64]) -> DetectionResult {
        let entities: Vec<Entity> = confidences
            .iter()
            .enumerate()
            .map(|(i, confidence)| {
                Entity::new(
                    format!("value-{i}"),
                    EntityType::Email,
                    i * 10,
                    i * 10 + 7,
                    *confidence,
                    DetectionSource::Rule,
                )
            })
            .collect();
        DetectionResult {
            entities,
            classification: crate::domain::DocumentClassification::unknown(
                crate::domain::Language::En,
            ),
            metadata: crate::domain::DetectionMetadata {
                document_id: "doc-1".to_string(),
                mode: crate::domain::DetectionMode::RegexOnly,
                total_duration_ms: 1,
                pass_results: Vec::new(),
                entity_counts: std::collections::BTreeMap::new(),
                flagged_count: 0,
            },
        }
    }

    #[test]
    fn test_read_document_uses_path_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.txt");
        std::fs::write(&path, "Dear Mr. Smith,").unwrap();

        let document = read_document(&path).unwrap();
        assert_eq!(document.id, path.display().to_string());
        assert_eq!(document.text, "Dear Mr. Smith,");
    }

    #[test]
    fn test_read_document_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, ArgusError::MalformedInput(_)));
    }

    #[test]
    fn test_reporting_floor_drops_weak_entities() {
        let result = apply_reporting_floor(sample_result(&[0.2, 0.5, 0.9]), 0.5);
        assert_eq!(result.entities.len(), 2);
        assert!(result.entities.iter().all(|e| e.confidence >= 0.5));
    }

    #[test]
    fn test_reporting_floor_zero_keeps_everything() {
        let result = apply_reporting_floor(sample_result(&[0.05, 0.9]), 0.0);
        assert_eq!(result.entities.len(), 2);
    }

    #[test]
    fn test_effective_parallelism_prefers_configured_value() {
        let mut config = ArgusConfig::default();
        config.detection.parallelism = 3;
        assert_eq!(effective_parallelism(&config), 3);

        config.detection.parallelism = 0;
        assert!(effective_parallelism(&config) > 0);
    }
}
