//! Document-type rule engine
//!
//! After validation, entities pass through per-document-type rules loaded
//! from a versioned TOML config (`document_rules.toml`, embedded default
//! plus optional file override). Rules boost entities sitting in structural
//! zones and enforce confidence thresholds. The engine only adjusts
//! confidence, annotates metadata and drops entities below the floor; it
//! never renames types or moves spans.

use crate::domain::{ArgusError, DocumentType, Entity, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const DEFAULT_RULES: &str = include_str!("../../patterns/document_rules.toml");

/// Structural zone a rule applies to, as a fraction of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// First 20% of the text
    Header,
    /// Last 10% of the text
    Footer,
    /// Last 20% of the text
    Signature,
}

impl Zone {
    /// Whether a span midpoint falls inside this zone of a `text_len`-byte
    /// document.
    pub fn contains(self, midpoint: usize, text_len: usize) -> bool {
        if text_len == 0 {
            return false;
        }
        let fraction = midpoint as f64 / text_len as f64;
        match self {
            Self::Header => fraction < 0.2,
            Self::Footer => fraction >= 0.9,
            Self::Signature => fraction >= 0.8,
        }
    }
}

/// One reusable rule definition referenced from `enabled_rules`
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    pub zone: Zone,
    pub boost: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Threshold block; unset fields fall back to `[global_settings]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdOverrides {
    pub min_confidence: Option<f64>,
    pub flag_for_review: Option<f64>,
    pub auto_anonymize: Option<f64>,
}

/// Per-document-type section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentTypeRules {
    #[serde(default)]
    pub enabled_rules: Vec<String>,
    #[serde(flatten)]
    pub thresholds: ThresholdOverrides,
}

/// The on-disk rules schema
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    pub version: u32,
    #[serde(default)]
    pub global_settings: ThresholdOverrides,
    #[serde(default)]
    pub document_types: BTreeMap<String, DocumentTypeRules>,
    #[serde(default)]
    pub rule_definitions: BTreeMap<String, RuleDefinition>,
}

impl RulesConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The rules compiled into the binary
    pub fn embedded_default() -> Result<Self> {
        Self::from_toml(DEFAULT_RULES)
    }

    /// Structural validation beyond what serde enforces
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(ArgusError::Configuration(
                "rules config version must be at least 1".into(),
            ));
        }
        for (key, section) in &self.document_types {
            if DocumentType::from_label(key).is_none() {
                return Err(ArgusError::Configuration(format!(
                    "unknown document type '{key}' in rules config"
                )));
            }
            for rule in &section.enabled_rules {
                if !self.rule_definitions.contains_key(rule) {
                    return Err(ArgusError::Configuration(format!(
                        "document type '{key}' enables undefined rule '{rule}'"
                    )));
                }
            }
            validate_thresholds(key, &section.thresholds)?;
        }
        validate_thresholds("global_settings", &self.global_settings)?;
        for (name, definition) in &self.rule_definitions {
            if !(0.0..=1.0).contains(&definition.boost) {
                return Err(ArgusError::Configuration(format!(
                    "rule '{name}' boost {} outside [0, 1]",
                    definition.boost
                )));
            }
        }
        Ok(())
    }

    /// Overlay `other` onto `self`: scalar fields from the override win,
    /// map entries replace per key.
    pub fn merge(mut self, other: RulesConfig) -> RulesConfig {
        self.version = other.version;
        self.global_settings = ThresholdOverrides {
            min_confidence: other
                .global_settings
                .min_confidence
                .or(self.global_settings.min_confidence),
            flag_for_review: other
                .global_settings
                .flag_for_review
                .or(self.global_settings.flag_for_review),
            auto_anonymize: other
                .global_settings
                .auto_anonymize
                .or(self.global_settings.auto_anonymize),
        };
        for (key, section) in other.document_types {
            self.document_types.insert(key, section);
        }
        for (name, definition) in other.rule_definitions {
            self.rule_definitions.insert(name, definition);
        }
        self
    }
}

fn validate_thresholds(context: &str, thresholds: &ThresholdOverrides) -> Result<()> {
    for (name, value) in [
        ("min_confidence", thresholds.min_confidence),
        ("flag_for_review", thresholds.flag_for_review),
        ("auto_anonymize", thresholds.auto_anonymize),
    ] {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(ArgusError::Configuration(format!(
                    "{context}: {name} {v} outside [0, 1]"
                )));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
    min_confidence: f64,
    flag_for_review: f64,
    auto_anonymize: f64,
}

#[derive(Debug, Clone)]
struct CompiledTypeRules {
    thresholds: Thresholds,
    zone_rules: Vec<(String, Zone, f64)>,
}

/// What the rule pass did to a document's entities
#[derive(Debug, Default)]
pub struct RuleOutcome {
    pub entities: Vec<Entity>,
    pub dropped: usize,
    pub boosted: usize,
    pub flagged: usize,
}

/// Applies the rules for a classified document type
#[derive(Debug, Clone)]
pub struct RuleEngine {
    version: u32,
    global: Thresholds,
    per_type: HashMap<DocumentType, CompiledTypeRules>,
}

impl RuleEngine {
    pub fn from_config(config: RulesConfig) -> Result<Self> {
        config.validate()?;
        let global = Thresholds {
            min_confidence: config.global_settings.min_confidence.unwrap_or(0.35),
            flag_for_review: config.global_settings.flag_for_review.unwrap_or(0.5),
            auto_anonymize: config.global_settings.auto_anonymize.unwrap_or(0.85),
        };
        let mut per_type = HashMap::new();
        for (key, section) in &config.document_types {
            let doc_type = DocumentType::from_label(key)
                .ok_or_else(|| ArgusError::Configuration(format!("unknown document type '{key}'")))?;
            let zone_rules = section
                .enabled_rules
                .iter()
                .filter_map(|name| {
                    config
                        .rule_definitions
                        .get(name)
                        .map(|d| (name.clone(), d.zone, d.boost))
                })
                .collect();
            per_type.insert(
                doc_type,
                CompiledTypeRules {
                    thresholds: Thresholds {
                        min_confidence: section
                            .thresholds
                            .min_confidence
                            .unwrap_or(global.min_confidence),
                        flag_for_review: section
                            .thresholds
                            .flag_for_review
                            .unwrap_or(global.flag_for_review),
                        auto_anonymize: section
                            .thresholds
                            .auto_anonymize
                            .unwrap_or(global.auto_anonymize),
                    },
                    zone_rules,
                },
            );
        }
        Ok(Self {
            version: config.version,
            global,
            per_type,
        })
    }

    /// Engine from the embedded rules, optionally overlaid with a file.
    /// A broken override falls back to the embedded rules with one error
    /// log rather than failing the run. The override is validated after
    /// the merge, so it may reference embedded rule definitions.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let base = RulesConfig::embedded_default()?;
        let Some(path) = override_path else {
            return Self::from_config(base);
        };
        let merged = std::fs::read_to_string(path)
            .map_err(ArgusError::from)
            .and_then(|contents| toml::from_str::<RulesConfig>(&contents).map_err(ArgusError::from))
            .map(|file_config| base.clone().merge(file_config))
            .and_then(|merged| {
                merged.validate()?;
                Ok(merged)
            });
        match merged {
            Ok(config) => Self::from_config(config),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "invalid rules override, using embedded defaults"
                );
                Self::from_config(base)
            }
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Run the rules for `document_type` over validated entities.
    /// `text_len` is the byte length of the text the spans refer to.
    pub fn apply(
        &self,
        entities: Vec<Entity>,
        document_type: DocumentType,
        text_len: usize,
    ) -> RuleOutcome {
        let compiled = self.per_type.get(&document_type);
        let thresholds = compiled.map_or(self.global, |c| c.thresholds);
        let zone_rules: &[(String, Zone, f64)] =
            compiled.map_or(&[], |c| c.zone_rules.as_slice());

        let mut outcome = RuleOutcome::default();
        for mut entity in entities {
            let mut applied: Vec<&str> = Vec::new();
            for (name, zone, boost) in zone_rules {
                if zone.contains(entity.midpoint(), text_len) {
                    entity.set_confidence(entity.confidence + boost);
                    applied.push(name);
                }
            }
            if !applied.is_empty() {
                outcome.boosted += 1;
                entity.annotate("rules_applied", serde_json::json!(applied));
            }

            if entity.confidence < thresholds.min_confidence {
                outcome.dropped += 1;
                tracing::debug!(
                    entity_type = %entity.entity_type,
                    confidence = entity.confidence,
                    floor = thresholds.min_confidence,
                    "entity dropped below confidence floor"
                );
                continue;
            }
            if entity.confidence < thresholds.flag_for_review {
                entity.annotate("flagged_for_review", serde_json::json!(true));
                outcome.flagged += 1;
            }
            if entity.confidence >= thresholds.auto_anonymize {
                entity.annotate("auto_anonymize", serde_json::json!(true));
            }
            outcome.entities.push(entity);
        }
        outcome
    }
}
