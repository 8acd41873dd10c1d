//! The multi-pass detection pipeline
//!
//! [`DetectionPipeline`] wires the passes together and runs them strictly in
//! order for one document: normalize, regex detection, optional neural NER
//! with fusion, context scoring, deny filtering, validation, classification
//! with rules, and finally the boundary pass that translates spans back into
//! the caller's coordinate space. Entities move through the middle passes in
//! normalized-text coordinates; only the boundary pass converts them.
//!
//! The pipeline is shared-read: `detect` takes `&self`, so one instance can
//! scan many documents concurrently. Cancellation is cooperative through a
//! [`watch`] channel checked at every pass boundary, and callers can observe
//! coarse progress through a callback.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::sync::watch;

use crate::adapters::ner::{HttpNerModel, NerModel};
use crate::config::ArgusConfig;
use crate::core::classify::DocumentClassifier;
use crate::core::context::ContextEnhancer;
use crate::core::denylist::{DenyListConfig, DenyListHandle};
use crate::core::detect::{PatternRegistry, RegexDetector};
use crate::core::merge;
use crate::core::normalize::TextNormalizer;
use crate::core::rules::RuleEngine;
use crate::core::validators::{ValidationConfidence, ValidatorRegistry};
use crate::domain::{
    ArgusError, DetectionMetadata, DetectionMode, DetectionResult, DetectionSource,
    DocumentClassification, DocumentInput, Language, PassStats, Result,
};

/// Progress notification emitted at pass boundaries
///
/// `percent` is a coarse estimate based on the pass about to run, not a
/// measured fraction of remaining work.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Identifier of the document being scanned
    pub document_id: String,
    /// Name of the pass about to run, or `complete`
    pub stage: &'static str,
    /// Estimated completion, 0 to 100
    pub percent: u8,
}

type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// The sequential multi-pass detection pipeline
///
/// Construct one per configuration with [`Self::from_config`] and reuse it
/// across documents; all pass state is per-call.
pub struct DetectionPipeline {
    normalizer: TextNormalizer,
    registry: Arc<PatternRegistry>,
    detector: RegexDetector,
    ner: Option<Arc<dyn NerModel>>,
    deny: DenyListHandle,
    enhancer: ContextEnhancer,
    validators: ValidatorRegistry,
    classifier: DocumentClassifier,
    rules: RuleEngine,
    default_language: Option<Language>,
    shutdown: Option<watch::Receiver<bool>>,
    progress: Option<ProgressCallback>,
}

impl DetectionPipeline {
    /// Build a pipeline from configuration
    ///
    /// Pattern, deny-list and rules assets load from their configured
    /// override paths or fall back to the embedded defaults. The HTTP NER
    /// backend is attached only when `[ner]` is enabled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an asset override is unreadable in
    /// a non-recoverable way or the NER backend cannot be constructed.
    pub fn from_config(config: &ArgusConfig) -> Result<Self> {
        let registry = Arc::new(PatternRegistry::load(config.patterns.path.as_deref())?);
        let detector = RegexDetector::new(Arc::clone(&registry));
        let deny = DenyListHandle::new(DenyListConfig::load(config.deny_list.path.as_deref())?);
        let rules = RuleEngine::load(config.rules.path.as_deref())?;

        let ner: Option<Arc<dyn NerModel>> = if config.ner.enabled {
            let model = HttpNerModel::from_config(&config.ner)?;
            Some(Arc::new(model))
        } else {
            None
        };

        Ok(Self {
            normalizer: TextNormalizer::new(),
            registry,
            detector,
            ner,
            deny,
            enhancer: ContextEnhancer::new(),
            validators: ValidatorRegistry::with_defaults(),
            classifier: DocumentClassifier::new(),
            rules,
            default_language: config.detection.default_language,
            shutdown: None,
            progress: None,
        })
    }

    /// Attach or replace the NER backend
    pub fn with_ner(mut self, model: Arc<dyn NerModel>) -> Self {
        self.ner = Some(model);
        self
    }

    /// Replace the rule engine
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Attach a shutdown signal checked at every pass boundary
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Attach a progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Deny-list handle, for runtime additions from reviewer feedback
    pub fn deny_list(&self) -> &DenyListHandle {
        &self.deny
    }

    /// Run all passes over one document
    ///
    /// Entity spans in the result refer to `document.text` as submitted;
    /// entity text carries the canonical (normalized) form, so a de-obfuscated
    /// address reads `john@example.com` while its span covers the original
    /// `john (at) example (dot) com`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgusError::Cancelled`] when the shutdown signal fires
    /// between passes. Detection itself degrades instead of failing: an
    /// unreachable NER backend drops the run to regex-only candidates.
    pub async fn detect(&self, document: &DocumentInput) -> Result<DetectionResult> {
        let run_started = Instant::now();
        let mut pass_results: Vec<PassStats> = Vec::with_capacity(8);
        let mut mode = if self.ner.is_some() {
            DetectionMode::Hybrid
        } else {
            DetectionMode::RegexOnly
        };
        let hint = document.language_hint.or(self.default_language);

        self.checkpoint("normalize")?;
        self.emit(document, "normalize", 0);
        let started = Instant::now();
        let norm = self.normalizer.normalize(&document.text);
        pass_results.push(PassStats::unchanged("normalize", elapsed_ms(started)));

        if norm.is_empty() {
            tracing::debug!(document_id = %document.id, "empty document, nothing to detect");
            self.emit(document, "complete", 100);
            return Ok(DetectionResult {
                entities: Vec::new(),
                classification: DocumentClassification::unknown(hint.unwrap_or_default()),
                metadata: DetectionMetadata {
                    document_id: document.id.clone(),
                    mode,
                    total_duration_ms: elapsed_ms(run_started),
                    pass_results,
                    entity_counts: BTreeMap::new(),
                    flagged_count: 0,
                },
            });
        }

        let text = norm.normalized_text.as_str();
        // The same vote `classify` takes later, so the middle passes and the
        // final classification agree on the document language.
        let language = self.classifier.detect_language(text, hint);

        self.checkpoint("detect")?;
        self.emit(document, "detect", 15);
        let started = Instant::now();
        let mut entities = self.detector.detect(text);
        pass_results.push(PassStats {
            pass_name: "detect".into(),
            entities_added: entities.len(),
            entities_modified: 0,
            entities_removed: 0,
            duration_ms: elapsed_ms(started),
        });

        if let Some(model) = &self.ner {
            self.checkpoint("ner")?;
            self.emit(document, "ner", 30);
            let started = Instant::now();
            match model.predict(text).await {
                Ok(tokens) => {
                    let ml_entities = merge::stitch_tokens(&tokens, text);
                    let before = entities.len();
                    entities = merge::fuse(entities, ml_entities);
                    let fused = entities
                        .iter()
                        .filter(|e| e.source == DetectionSource::Both)
                        .count();
                    pass_results.push(PassStats {
                        pass_name: "ner".into(),
                        entities_added: entities.len() - before,
                        entities_modified: fused,
                        entities_removed: 0,
                        duration_ms: elapsed_ms(started),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        model = model.name(),
                        error = %e,
                        "NER backend failed, degrading to regex-only detection"
                    );
                    mode = DetectionMode::Fallback;
                    pass_results.push(PassStats::unchanged("ner", elapsed_ms(started)));
                }
            }
        }

        self.checkpoint("context")?;
        self.emit(document, "context", 45);
        let started = Instant::now();
        let deny = self.deny.load();
        let mut modified = 0;
        for entity in &mut entities {
            let words = self.registry.context_words_for(entity.entity_type);
            let outcome = self.enhancer.enhance(entity, text, words, language, &deny);
            if outcome.skipped
                || (outcome.entity.confidence - entity.confidence).abs() > f64::EPSILON
            {
                modified += 1;
            }
            *entity = outcome.entity;
        }
        pass_results.push(PassStats {
            pass_name: "context".into(),
            entities_added: 0,
            entities_modified: modified,
            entities_removed: 0,
            duration_ms: elapsed_ms(started),
        });

        self.checkpoint("deny")?;
        self.emit(document, "deny", 55);
        let started = Instant::now();
        let before = entities.len();
        entities.retain(|entity| {
            let denied = deny.is_denied(&entity.text, entity.entity_type, Some(language));
            if denied {
                tracing::debug!(
                    entity_type = %entity.entity_type,
                    text = %entity.text,
                    "deny list veto"
                );
            }
            !denied
        });
        pass_results.push(PassStats {
            pass_name: "deny".into(),
            entities_added: 0,
            entities_modified: 0,
            entities_removed: before - entities.len(),
            duration_ms: elapsed_ms(started),
        });

        self.checkpoint("validate")?;
        self.emit(document, "validate", 65);
        let started = Instant::now();
        let mut modified = 0;
        for entity in &mut entities {
            let Some(result) = self.validators.validate(entity.entity_type, &entity.text) else {
                continue;
            };
            let blended = if result.is_valid {
                entity.confidence.max(result.confidence)
            } else {
                entity.confidence.min(result.confidence)
            };
            if (blended - entity.confidence).abs() > f64::EPSILON {
                modified += 1;
            }
            entity.set_confidence(blended);
            if let Some(level) = ValidationConfidence::from_score(result.confidence) {
                entity.annotate("validation", json!(level.label()));
            }
            if let Some(reason) = result.reason {
                entity.annotate("validation_reason", json!(reason));
            }
        }
        pass_results.push(PassStats {
            pass_name: "validate".into(),
            entities_added: 0,
            entities_modified: modified,
            entities_removed: 0,
            duration_ms: elapsed_ms(started),
        });

        self.checkpoint("classify")?;
        self.emit(document, "classify", 80);
        let started = Instant::now();
        let classification = self.classifier.classify(text, hint);
        let outcome = self.rules.apply(entities, classification.document_type, norm.len());
        let mut entities = outcome.entities;
        pass_results.push(PassStats {
            pass_name: "classify".into(),
            entities_added: 0,
            entities_modified: outcome.boosted,
            entities_removed: outcome.dropped,
            duration_ms: elapsed_ms(started),
        });

        self.checkpoint("boundary")?;
        self.emit(document, "boundary", 90);
        let started = Instant::now();
        let mut remapped = 0;
        for entity in &mut entities {
            let (start, end) = norm.map_span(entity.start, entity.end);
            if (start, end) != (entity.start, entity.end) {
                remapped += 1;
            }
            entity.start = start;
            entity.end = end;
        }
        entities.sort_by_key(|e| (e.start, e.end));
        pass_results.push(PassStats {
            pass_name: "boundary".into(),
            entities_added: 0,
            entities_modified: remapped,
            entities_removed: 0,
            duration_ms: elapsed_ms(started),
        });

        let mut entity_counts: BTreeMap<String, usize> = BTreeMap::new();
        for entity in &entities {
            *entity_counts
                .entry(entity.entity_type.label().to_string())
                .or_insert(0) += 1;
        }

        self.emit(document, "complete", 100);
        let total_duration_ms = elapsed_ms(run_started);
        tracing::info!(
            document_id = %document.id,
            mode = %mode,
            document_type = %classification.document_type,
            entities = entities.len(),
            flagged = outcome.flagged,
            duration_ms = total_duration_ms,
            "document scan complete"
        );

        Ok(DetectionResult {
            entities,
            classification,
            metadata: DetectionMetadata {
                document_id: document.id.clone(),
                mode,
                total_duration_ms,
                pass_results,
                entity_counts,
                flagged_count: outcome.flagged,
            },
        })
    }

    /// Fail fast when shutdown was requested
    fn checkpoint(&self, pass: &'static str) -> Result<()> {
        if let Some(shutdown) = &self.shutdown {
            if *shutdown.borrow() {
                tracing::info!(pass, "shutdown requested, abandoning detection");
                return Err(ArgusError::Cancelled(pass.to_string()));
            }
        }
        Ok(())
    }

    fn emit(&self, document: &DocumentInput, stage: &'static str, percent: u8) {
        if let Some(callback) = &self.progress {
            callback(ProgressEvent {
                document_id: document.id.clone(),
                stage,
                percent,
            });
        }
    }
}

impl std::fmt::Debug for DetectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionPipeline")
            .field("mode", &self.ner.as_ref().map_or("regex-only", |_| "hybrid"))
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
