//! Regex candidate generation
//!
//! Runs every compiled pattern over the normalized text and emits `Rule`
//! entities. When a pattern carries a capture group, group 1 becomes the
//! entity span (salutation-led names, postal codes with a trailing place
//! name); otherwise the whole match does. Exact `(start, end, type)`
//! duplicates collapse to the higher-confidence candidate.

pub mod registry;

pub use registry::{CompiledPattern, PatternRegistry, PatternsConfig};

use crate::domain::{DetectionSource, Entity, EntityType};
use std::collections::HashMap;
use std::sync::Arc;

/// Pattern-based detector over a shared registry
#[derive(Debug, Clone)]
pub struct RegexDetector {
    registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    /// Run all patterns over `text` and return deduplicated candidates
    /// sorted by span start.
    pub fn detect(&self, text: &str) -> Vec<Entity> {
        let mut candidates = Vec::new();
        for entity_type in EntityType::all() {
            for compiled in self.registry.patterns_for(*entity_type) {
                for result in compiled.regex.captures_iter(text) {
                    let caps = match result {
                        Ok(caps) => caps,
                        Err(e) => {
                            // Backtracking limits surface here, not at compile
                            // time; give up on this pattern for this document.
                            tracing::debug!(
                                entity_type = %entity_type,
                                error = %e,
                                "pattern aborted mid-scan"
                            );
                            break;
                        }
                    };
                    let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                        continue;
                    };
                    if m.as_str().is_empty() {
                        continue;
                    }
                    candidates.push(Entity::new(
                        m.as_str(),
                        *entity_type,
                        m.start(),
                        m.end(),
                        compiled.confidence,
                        DetectionSource::Rule,
                    ));
                }
            }
        }
        dedup_exact(candidates)
    }
}

/// Collapse exact `(start, end, type)` duplicates, keeping the higher
/// confidence, and sort by start offset.
fn dedup_exact(candidates: Vec<Entity>) -> Vec<Entity> {
    let mut best: HashMap<(usize, usize, EntityType), Entity> = HashMap::new();
    for entity in candidates {
        let key = (entity.start, entity.end, entity.entity_type);
        match best.get(&key) {
            Some(existing) if existing.confidence >= entity.confidence => {}
            _ => {
                best.insert(key, entity);
            }
        }
    }
    let mut entities: Vec<Entity> = best.into_values().collect();
    entities.sort_by_key(|e| (e.start, e.end, e.entity_type.label()));
    entities
}
