//! Pattern registry backing the regex detection pass
//!
//! Patterns and context words live in `pii_patterns.toml`, embedded at
//! compile time with an optional file override. Patterns compile through
//! `fancy-regex` so lookarounds are available to the pattern author; one
//! broken pattern is skipped with an error log and the rest still load.

use crate::core::context::ContextWord;
use crate::domain::{ArgusError, EntityType, Result};
use fancy_regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const DEFAULT_PATTERNS: &str = include_str!("../../../patterns/pii_patterns.toml");

/// One pattern as written in the TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    pub pattern: String,
    pub confidence: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A context word bound to an entity type
#[derive(Debug, Clone, Deserialize)]
pub struct ContextWordEntry {
    pub entity_type: String,
    #[serde(flatten)]
    pub word: ContextWord,
}

/// The on-disk pattern schema
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternsConfig {
    #[serde(default)]
    pub patterns: BTreeMap<String, Vec<PatternEntry>>,
    #[serde(default)]
    pub context_words: Vec<ContextWordEntry>,
}

impl PatternsConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Key and range checks; individual regex compilation is deferred to
    /// [`PatternRegistry::from_config`] where a bad pattern is non-fatal.
    pub fn validate(&self) -> Result<()> {
        for (key, entries) in &self.patterns {
            if EntityType::from_label(key).is_none() {
                return Err(ArgusError::Configuration(format!(
                    "unknown entity type '{key}' in pattern config"
                )));
            }
            for entry in entries {
                if !(0.0..=1.0).contains(&entry.confidence) {
                    return Err(ArgusError::Configuration(format!(
                        "pattern confidence {} for '{key}' outside [0, 1]",
                        entry.confidence
                    )));
                }
            }
        }
        for entry in &self.context_words {
            if EntityType::from_label(&entry.entity_type).is_none() {
                return Err(ArgusError::Configuration(format!(
                    "unknown entity type '{}' in context words",
                    entry.entity_type
                )));
            }
            if entry.word.weight <= 0.0 {
                return Err(ArgusError::Configuration(format!(
                    "context word '{}' weight must be positive",
                    entry.word.word
                )));
            }
        }
        Ok(())
    }
}

/// A pattern ready to run
#[derive(Debug)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub confidence: f64,
}

/// Compiled patterns and context words, keyed by entity type
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: HashMap<EntityType, Vec<CompiledPattern>>,
    context_words: HashMap<EntityType, Vec<ContextWord>>,
}

impl PatternRegistry {
    pub fn from_config(config: PatternsConfig) -> Result<Self> {
        config.validate()?;
        let mut patterns: HashMap<EntityType, Vec<CompiledPattern>> = HashMap::new();
        for (key, entries) in &config.patterns {
            let entity_type = EntityType::from_label(key)
                .ok_or_else(|| ArgusError::Configuration(format!("unknown entity type '{key}'")))?;
            for entry in entries {
                match Regex::new(&entry.pattern) {
                    Ok(regex) => patterns.entry(entity_type).or_default().push(CompiledPattern {
                        regex,
                        confidence: entry.confidence,
                    }),
                    Err(e) => {
                        tracing::error!(
                            entity_type = %entity_type,
                            pattern = %entry.pattern,
                            error = %e,
                            "skipping pattern that does not compile"
                        );
                    }
                }
            }
        }
        let mut context_words: HashMap<EntityType, Vec<ContextWord>> = HashMap::new();
        for entry in config.context_words {
            let entity_type = EntityType::from_label(&entry.entity_type).ok_or_else(|| {
                ArgusError::Configuration(format!("unknown entity type '{}'", entry.entity_type))
            })?;
            context_words.entry(entity_type).or_default().push(entry.word);
        }
        Ok(Self {
            patterns,
            context_words,
        })
    }

    /// The patterns compiled into the binary
    pub fn embedded_default() -> Result<Self> {
        Self::from_config(PatternsConfig::from_toml(DEFAULT_PATTERNS)?)
    }

    /// Registry from the embedded patterns or a full-file override.
    /// A broken override falls back to the embedded patterns with one
    /// error log.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let Some(path) = override_path else {
            return Self::embedded_default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(ArgusError::from)
            .and_then(|contents| PatternsConfig::from_toml(&contents))
            .and_then(Self::from_config);
        match loaded {
            Ok(registry) => Ok(registry),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "invalid pattern override, using embedded defaults"
                );
                Self::embedded_default()
            }
        }
    }

    pub fn patterns_for(&self, entity_type: EntityType) -> &[CompiledPattern] {
        self.patterns.get(&entity_type).map_or(&[], Vec::as_slice)
    }

    pub fn context_words_for(&self, entity_type: EntityType) -> &[ContextWord] {
        self.context_words.get(&entity_type).map_or(&[], Vec::as_slice)
    }

    /// Total number of compiled patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.values().map(Vec::len).sum()
    }

    /// Entity types that have at least one pattern
    pub fn covered_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.patterns.keys().copied().collect();
        types.sort_by_key(|t| t.label());
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_compiles() {
        let registry = PatternRegistry::embedded_default().unwrap();
        assert!(registry.pattern_count() >= 15);
        for ty in EntityType::all() {
            assert!(
                !registry.patterns_for(*ty).is_empty(),
                "no pattern covers {ty}"
            );
        }
        assert!(!registry.context_words_for(EntityType::Iban).is_empty());
    }

    #[test]
    fn test_bad_pattern_is_skipped_not_fatal() {
        let config = PatternsConfig::from_toml(
            r#"
            [[patterns.EMAIL]]
            pattern = '[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+'
            confidence = 0.7

            [[patterns.EMAIL]]
            pattern = '([unclosed'
            confidence = 0.9
            "#,
        )
        .unwrap();
        let registry = PatternRegistry::from_config(config).unwrap();
        assert_eq!(registry.pattern_count(), 1);
    }

    #[test]
    fn test_unknown_entity_type_key_rejected() {
        let result = PatternsConfig::from_toml(
            r#"
            [[patterns.PASSPORT]]
            pattern = '\d+'
            confidence = 0.5
            "#,
        );
        assert!(matches!(result, Err(ArgusError::Configuration(_))));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let result = PatternsConfig::from_toml(
            r#"
            [[patterns.EMAIL]]
            pattern = 'x'
            confidence = 1.4
            "#,
        );
        assert!(matches!(result, Err(ArgusError::Configuration(_))));
    }

    #[test]
    fn test_context_words_parse_with_polarity() {
        let config = PatternsConfig::from_toml(
            r#"
            [[context_words]]
            entity_type = "EMAIL"
            word = "beispiel"
            weight = 0.9
            polarity = "negative"
            "#,
        )
        .unwrap();
        let registry = PatternRegistry::from_config(config).unwrap();
        let words = registry.context_words_for(EntityType::Email);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "beispiel");
        assert_eq!(words[0].polarity, crate::core::context::Polarity::Negative);
    }

    #[test]
    fn test_override_file_replaces_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(
            &path,
            "[[patterns.EMAIL]]\npattern = 'x@y'\nconfidence = 0.5\n",
        )
        .unwrap();
        let registry = PatternRegistry::load(Some(&path)).unwrap();
        assert_eq!(registry.pattern_count(), 1);
    }

    #[test]
    fn test_broken_override_falls_back_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(&path, "patterns = 3").unwrap();
        let registry = PatternRegistry::load(Some(&path)).unwrap();
        assert!(registry.pattern_count() >= 15);
    }
}
