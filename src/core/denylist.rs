//! False-positive deny list
//!
//! Known-bad matches (short acronyms, salutations, legal-entity suffixes,
//! street-type prefixes) are vetoed regardless of any other signal. Three
//! scopes apply to every check: global, per entity type, per language. The
//! compiled list is an immutable snapshot behind [`DenyListHandle`]; runtime
//! additions from feedback ingestion build a fresh snapshot and swap it in,
//! so readers never observe a half-updated list.

use crate::domain::{EntityType, Language, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

/// Embedded fallback shipped with the binary
const DEFAULT_DENY_LIST: &str = include_str!("../../patterns/deny_list.toml");

/// A regex entry in the deny configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    /// Regex source, matched against the entire candidate text
    pub pattern: String,
    /// Scoped flags, e.g. `"i"` for case-insensitive
    #[serde(default)]
    pub flags: String,
}

impl PatternEntry {
    fn compile(&self) -> std::result::Result<Regex, regex::Error> {
        compile_anchored(&self.pattern, &self.flags)
    }
}

/// Terms and patterns for one scope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DenyScopeConfig {
    /// Exact terms, compared case-insensitively against the whole text
    #[serde(default)]
    pub terms: Vec<String>,
    /// Regex descriptors
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// Deny-list configuration, loadable from `deny_list.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DenyListConfig {
    /// Applies to every entity
    #[serde(default)]
    pub global: DenyScopeConfig,
    /// Keyed by entity type label (`NAME`, `IBAN`, ...)
    #[serde(default)]
    pub by_entity_type: HashMap<String, DenyScopeConfig>,
    /// Keyed by ISO 639-1 code (`en`, `fr`, `de`)
    #[serde(default)]
    pub by_language: HashMap<String, DenyScopeConfig>,
}

impl DenyListConfig {
    /// Parse a TOML deny-list document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// The deny list embedded in the binary
    pub fn embedded_default() -> Result<Self> {
        Self::from_toml(DEFAULT_DENY_LIST)
    }

    /// Configuration from the embedded list or a full-file override.
    /// A broken override falls back to the embedded list with one error log.
    pub fn load(override_path: Option<&std::path::Path>) -> Result<Self> {
        let Some(path) = override_path else {
            return Self::embedded_default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(crate::domain::ArgusError::from)
            .and_then(|contents| Self::from_toml(&contents))
            .and_then(|config| {
                config
                    .validate()
                    .map_err(crate::domain::ArgusError::Configuration)?;
                Ok(config)
            });
        match loaded {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "invalid deny-list override, using embedded defaults"
                );
                Self::embedded_default()
            }
        }
    }

    /// Check scope keys and pattern syntax without compiling a snapshot
    pub fn validate(&self) -> std::result::Result<(), String> {
        for key in self.by_entity_type.keys() {
            if EntityType::from_label(key).is_none() {
                return Err(format!("unknown entity type in deny list: {key}"));
            }
        }
        for key in self.by_language.keys() {
            if Language::from_code(key).is_none() {
                return Err(format!("unknown language in deny list: {key}"));
            }
        }
        for (scope, entries) in self.all_scopes() {
            for entry in &entries.patterns {
                entry
                    .compile()
                    .map_err(|e| format!("invalid deny pattern in {scope}: {e}"))?;
            }
        }
        Ok(())
    }

    fn all_scopes(&self) -> Vec<(String, &DenyScopeConfig)> {
        let mut scopes = vec![("global".to_string(), &self.global)];
        for (key, scope) in &self.by_entity_type {
            scopes.push((format!("by_entity_type.{key}"), scope));
        }
        for (key, scope) in &self.by_language {
            scopes.push((format!("by_language.{key}"), scope));
        }
        scopes
    }
}

/// One compiled scope
#[derive(Debug, Default)]
struct DenyScope {
    terms: HashSet<String>,
    patterns: Vec<Regex>,
}

impl DenyScope {
    fn compile(config: &DenyScopeConfig, scope_name: &str) -> Self {
        let terms = config
            .terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        let mut patterns = Vec::with_capacity(config.patterns.len());
        for entry in &config.patterns {
            match entry.compile() {
                Ok(regex) => patterns.push(regex),
                Err(e) => {
                    tracing::error!(
                        scope = %scope_name,
                        pattern = %entry.pattern,
                        error = %e,
                        "Skipping invalid deny-list pattern"
                    );
                }
            }
        }
        Self { terms, patterns }
    }

    fn matches(&self, text: &str, lowercase: &str) -> bool {
        if self.terms.contains(lowercase) {
            return true;
        }
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Immutable compiled deny list
///
/// Deterministic: the same `(text, type, language)` always yields the same
/// verdict for one compiled snapshot.
#[derive(Debug, Default)]
pub struct DenyList {
    global: DenyScope,
    by_entity_type: HashMap<EntityType, DenyScope>,
    by_language: HashMap<Language, DenyScope>,
}

impl DenyList {
    /// Compile a configuration, skipping invalid patterns and unknown scope
    /// keys with an error log
    pub fn compile(config: &DenyListConfig) -> Self {
        let global = DenyScope::compile(&config.global, "global");

        let mut by_entity_type = HashMap::new();
        for (key, scope) in &config.by_entity_type {
            match EntityType::from_label(key) {
                Some(entity_type) => {
                    let name = format!("by_entity_type.{key}");
                    by_entity_type.insert(entity_type, DenyScope::compile(scope, &name));
                }
                None => {
                    tracing::error!(key = %key, "Skipping deny-list scope for unknown entity type");
                }
            }
        }

        let mut by_language = HashMap::new();
        for (key, scope) in &config.by_language {
            match Language::from_code(key) {
                Some(language) => {
                    let name = format!("by_language.{key}");
                    by_language.insert(language, DenyScope::compile(scope, &name));
                }
                None => {
                    tracing::error!(key = %key, "Skipping deny-list scope for unknown language");
                }
            }
        }

        Self {
            global,
            by_entity_type,
            by_language,
        }
    }

    /// Test whether a candidate is vetoed in any applicable scope
    pub fn is_denied(&self, text: &str, entity_type: EntityType, language: Option<Language>) -> bool {
        let trimmed = text.trim();
        let lowercase = trimmed.to_lowercase();
        if self.global.matches(trimmed, &lowercase) {
            return true;
        }
        if let Some(scope) = self.by_entity_type.get(&entity_type) {
            if scope.matches(trimmed, &lowercase) {
                return true;
            }
        }
        if let Some(scope) = language.and_then(|l| self.by_language.get(&l)) {
            if scope.matches(trimmed, &lowercase) {
                return true;
            }
        }
        false
    }
}

/// Shared deny list with atomic snapshot swap
///
/// The handle owns the current configuration (source of truth for dynamic
/// additions) and the compiled snapshot readers borrow through [`Self::load`].
pub struct DenyListHandle {
    config: Mutex<DenyListConfig>,
    snapshot: RwLock<Arc<DenyList>>,
}

impl DenyListHandle {
    /// Compile `config` and wrap it in a handle
    pub fn new(config: DenyListConfig) -> Self {
        let snapshot = Arc::new(DenyList::compile(&config));
        Self {
            config: Mutex::new(config),
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Current snapshot; a cheap `Arc` clone valid until dropped
    pub fn load(&self) -> Arc<DenyList> {
        self.snapshot.read().unwrap().clone()
    }

    /// Replace the whole configuration with a fresh snapshot
    pub fn update(&self, config: DenyListConfig) {
        let compiled = Arc::new(DenyList::compile(&config));
        *self.config.lock().unwrap() = config;
        *self.snapshot.write().unwrap() = compiled;
    }

    /// Add an exact term to the global or a per-type scope
    pub fn add_term(&self, entity_type: Option<EntityType>, term: &str) {
        let mut config = self.config.lock().unwrap();
        scope_for(&mut config, entity_type).terms.push(term.to_string());
        self.swap_in(&config);
    }

    /// Add a regex pattern to the global or a per-type scope
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the pattern does not compile; the
    /// active snapshot is left untouched.
    pub fn add_pattern(&self, entity_type: Option<EntityType>, pattern: &str) -> Result<()> {
        compile_anchored(pattern, "")?;
        let mut config = self.config.lock().unwrap();
        scope_for(&mut config, entity_type).patterns.push(PatternEntry {
            pattern: pattern.to_string(),
            flags: String::new(),
        });
        self.swap_in(&config);
        Ok(())
    }

    /// Add a regex pattern to a language scope
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the pattern does not compile.
    pub fn add_language_pattern(&self, language: Language, pattern: &str) -> Result<()> {
        compile_anchored(pattern, "")?;
        let mut config = self.config.lock().unwrap();
        config
            .by_language
            .entry(language.code().to_string())
            .or_default()
            .patterns
            .push(PatternEntry {
                pattern: pattern.to_string(),
                flags: String::new(),
            });
        self.swap_in(&config);
        Ok(())
    }

    fn swap_in(&self, config: &DenyListConfig) {
        let compiled = Arc::new(DenyList::compile(config));
        *self.snapshot.write().unwrap() = compiled;
    }
}

impl std::fmt::Debug for DenyListHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenyListHandle").finish_non_exhaustive()
    }
}

fn scope_for<'a>(
    config: &'a mut DenyListConfig,
    entity_type: Option<EntityType>,
) -> &'a mut DenyScopeConfig {
    match entity_type {
        None => &mut config.global,
        Some(ty) => config
            .by_entity_type
            .entry(ty.label().to_string())
            .or_default(),
    }
}

/// Compile a deny pattern anchored to the whole candidate text
fn compile_anchored(pattern: &str, flags: &str) -> std::result::Result<Regex, regex::Error> {
    let source = if flags.is_empty() {
        format!("^(?:{pattern})$")
    } else {
        format!("^(?{flags}:{pattern})$")
    };
    Regex::new(&source)
}
