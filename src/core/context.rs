//! Lemma-aware context scoring
//!
//! Labels usually sit next to the values they describe ("IBAN:", "Nom:",
//! "Invoice No"). This pass inspects a window on both sides of an entity,
//! matches configured context words against the window text (exact substring
//! and lemmatized word set), and nudges the entity's confidence. Scaling
//! follows the calibration of the Microsoft Presidio context model: the
//! aggregate is normalized by the stronger direction weight and scaled by a
//! similarity factor that also caps the total boost.

use crate::core::denylist::DenyList;
use crate::core::lemma::Lemmatizer;
use crate::domain::{Entity, EntityType, Language};
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};

/// Whether a context word supports or contradicts the entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Default for Polarity {
    fn default() -> Self {
        Self::Positive
    }
}

/// A configured context word
#[derive(Debug, Clone, Deserialize)]
pub struct ContextWord {
    /// Word or phrase to look for near the entity
    pub word: String,
    /// Contribution strength
    #[serde(default = "default_word_weight")]
    pub weight: f64,
    /// Supporting or contradicting evidence
    #[serde(default)]
    pub polarity: Polarity,
}

fn default_word_weight() -> f64 {
    1.0
}

impl ContextWord {
    /// A positive context word with weight 1.0
    pub fn positive(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            weight: 1.0,
            polarity: Polarity::Positive,
        }
    }

    /// A negative context word with weight 1.0
    pub fn negative(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            weight: 1.0,
            polarity: Polarity::Negative,
        }
    }

    /// Adjust the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Per-entity-type window configuration
#[derive(Debug, Clone, Copy)]
pub struct EnhancerSettings {
    /// Window size in bytes on each side of the span
    pub window: usize,
    /// Weight for hits before the entity; labels usually precede values
    pub preceding_weight: f64,
    /// Weight for hits after the entity
    pub following_weight: f64,
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            window: 60,
            preceding_weight: 1.2,
            following_weight: 0.8,
        }
    }
}

/// Outcome of one enhancement
#[derive(Debug, Clone)]
pub struct EnhancedOutcome {
    /// The confidence-adjusted entity copy
    pub entity: Entity,
    /// True when the deny list vetoed enhancement
    pub skipped: bool,
}

/// Context-window confidence scorer
pub struct ContextEnhancer {
    similarity_factor: f64,
    min_score_with_context: f64,
    settings: HashMap<EntityType, EnhancerSettings>,
    default_settings: EnhancerSettings,
    lemmatizer: Lemmatizer,
}

impl ContextEnhancer {
    /// Build an enhancer with the standard per-type windows
    ///
    /// Names, organizations and locations look 150 bytes out because prose
    /// labels sit further away; IBANs use a tight 40-byte window since their
    /// labels are immediately adjacent. Everything else gets 60.
    pub fn new() -> Self {
        let mut settings = HashMap::new();
        for ty in [EntityType::Name, EntityType::Organization, EntityType::Location] {
            settings.insert(
                ty,
                EnhancerSettings {
                    window: 150,
                    ..EnhancerSettings::default()
                },
            );
        }
        settings.insert(
            EntityType::Iban,
            EnhancerSettings {
                window: 40,
                ..EnhancerSettings::default()
            },
        );

        Self {
            similarity_factor: 0.35,
            min_score_with_context: 0.4,
            settings,
            default_settings: EnhancerSettings::default(),
            lemmatizer: Lemmatizer::new(),
        }
    }

    /// Override the similarity factor
    pub fn with_similarity_factor(mut self, factor: f64) -> Self {
        self.similarity_factor = factor;
        self
    }

    /// Override the floor applied when positive context is found
    pub fn with_min_score_with_context(mut self, floor: f64) -> Self {
        self.min_score_with_context = floor;
        self
    }

    /// Override the window settings for one entity type
    pub fn with_settings(mut self, entity_type: EntityType, settings: EnhancerSettings) -> Self {
        self.settings.insert(entity_type, settings);
        self
    }

    fn settings_for(&self, entity_type: EntityType) -> EnhancerSettings {
        self.settings
            .get(&entity_type)
            .copied()
            .unwrap_or(self.default_settings)
    }

    /// Produce a confidence-adjusted copy of `entity`
    ///
    /// `full_text` must be the text the entity's offsets refer to. When the
    /// deny list vetoes the entity text, the copy is returned unchanged with
    /// `skipped = true`; context evidence must never rescue a known false
    /// positive.
    pub fn enhance(
        &self,
        entity: &Entity,
        full_text: &str,
        context_words: &[ContextWord],
        language: Language,
        deny: &DenyList,
    ) -> EnhancedOutcome {
        let mut enhanced = entity.clone();

        if deny.is_denied(&entity.text, entity.entity_type, Some(language)) {
            enhanced.annotate("context_skipped", json!(true));
            return EnhancedOutcome {
                entity: enhanced,
                skipped: true,
            };
        }
        if context_words.is_empty() {
            return EnhancedOutcome {
                entity: enhanced,
                skipped: false,
            };
        }

        let settings = self.settings_for(entity.entity_type);
        let preceding = window_before(full_text, entity.start, settings.window);
        let following = window_after(full_text, entity.end, settings.window);

        let preceding_view = WindowView::build(preceding, language, &self.lemmatizer);
        let following_view = WindowView::build(following, language, &self.lemmatizer);

        let max_direction = settings.preceding_weight.max(settings.following_weight);
        let mut positive_raw = 0.0_f64;
        let mut negative_raw = 0.0_f64;

        for word in context_words {
            let mut contribution = 0.0_f64;
            if preceding_view.contains(&word.word, language, &self.lemmatizer) {
                contribution += word.weight * settings.preceding_weight;
            }
            if following_view.contains(&word.word, language, &self.lemmatizer) {
                contribution += word.weight * settings.following_weight;
            }
            // a word present on both sides still counts at most twice
            contribution = contribution.min(2.0 * word.weight);
            match word.polarity {
                Polarity::Positive => positive_raw += contribution,
                Polarity::Negative => negative_raw += contribution,
            }
        }

        let positive = (positive_raw / max_direction).min(1.0) * self.similarity_factor;
        let negative = (negative_raw / max_direction).min(1.0) * self.similarity_factor;
        let net = positive - negative;

        if net != 0.0 {
            let mut adjusted = entity.confidence + net;
            if net > 0.0 {
                adjusted = adjusted.max(self.min_score_with_context);
            }
            enhanced.set_confidence(adjusted);
            enhanced.annotate("context_boost", json!(net));
        }

        EnhancedOutcome {
            entity: enhanced,
            skipped: false,
        }
    }
}

impl Default for ContextEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased window text plus its lemmatized word set
struct WindowView {
    lowercase: String,
    lemmas: HashSet<String>,
}

impl WindowView {
    fn build(window: &str, language: Language, lemmatizer: &Lemmatizer) -> Self {
        let lowercase = window.to_lowercase();
        let lemmas = lowercase
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| lemmatizer.lemma(w, language))
            .collect();
        Self { lowercase, lemmas }
    }

    fn contains(&self, word: &str, language: Language, lemmatizer: &Lemmatizer) -> bool {
        let needle = word.to_lowercase();
        if self.lowercase.contains(&needle) {
            return true;
        }
        // phrases only match as substrings; single words also match by lemma
        if needle.split_whitespace().count() == 1 {
            return self.lemmas.contains(&lemmatizer.lemma(&needle, language));
        }
        false
    }
}

/// Slice up to `window` bytes ending at `pos`, clamped to a char boundary
fn window_before(text: &str, pos: usize, window: usize) -> &str {
    let pos = pos.min(text.len());
    let mut start = pos.saturating_sub(window);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..pos]
}

/// Slice up to `window` bytes starting at `pos`, clamped to a char boundary
fn window_after(text: &str, pos: usize, window: usize) -> &str {
    let pos = pos.min(text.len());
    let mut end = (pos + window).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[pos..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::denylist::{DenyListConfig, DenyScopeConfig};
    use crate::domain::DetectionSource;

    fn empty_deny() -> DenyList {
        DenyList::compile(&DenyListConfig::default())
    }

    fn entity_in(text: &str, needle: &str, entity_type: EntityType, confidence: f64) -> Entity {
        let start = text.find(needle).unwrap();
        Entity::new(
            needle,
            entity_type,
            start,
            start + needle.len(),
            confidence,
            DetectionSource::Rule,
        )
    }

    #[test]
    fn test_preceding_label_boosts_confidence() {
        let text = "IBAN: CH93 0076 2011 6238 5295 7 per end of month";
        let entity = entity_in(text, "CH93 0076 2011 6238 5295 7", EntityType::Iban, 0.5);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::positive("iban")],
            Language::En,
            &empty_deny(),
        );
        assert!(!outcome.skipped);
        assert!(outcome.entity.confidence > 0.5);
    }

    #[test]
    fn test_boost_never_exceeds_similarity_factor() {
        let text = "account iban bank payment transfer: value here for testing";
        let entity = entity_in(text, "value", EntityType::Iban, 0.5);
        let words: Vec<ContextWord> = ["account", "iban", "bank", "payment", "transfer"]
            .iter()
            .map(|w| ContextWord::positive(*w).with_weight(5.0))
            .collect();
        let outcome =
            ContextEnhancer::new().enhance(&entity, text, &words, Language::En, &empty_deny());
        assert!(outcome.entity.confidence <= 0.5 + 0.35 + 1e-9);
        assert!((outcome.entity.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_adding_positive_words_is_monotonic() {
        let text = "invoice number amount total due: 123456 end";
        let entity = entity_in(text, "123456", EntityType::Iban, 0.3);
        let enhancer = ContextEnhancer::new();
        let all = ["invoice", "number", "amount", "total"];
        let mut last = 0.0_f64;
        for n in 1..=all.len() {
            let words: Vec<ContextWord> =
                all[..n].iter().map(|w| ContextWord::positive(*w)).collect();
            let outcome = enhancer.enhance(&entity, text, &words, Language::En, &empty_deny());
            assert!(
                outcome.entity.confidence >= last,
                "confidence dropped when adding word {n}"
            );
            last = outcome.entity.confidence;
        }
    }

    #[test]
    fn test_word_on_both_sides_is_capped_at_twice_weight() {
        let text = "iban X iban";
        let entity = entity_in(text, "X", EntityType::Iban, 0.2);
        let enhancer = ContextEnhancer::new();
        let both = enhancer.enhance(
            &entity,
            text,
            &[ContextWord::positive("iban")],
            Language::En,
            &empty_deny(),
        );
        // capped contribution = 2.0, normalized 2.0/1.2 saturates at 1.0,
        // so the boost equals the full similarity factor
        assert!((both.entity.confidence - (0.2 + 0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_preceding_weighs_more_than_following() {
        let enhancer = ContextEnhancer::new();
        let words = [ContextWord::positive("konto").with_weight(0.5)];

        let before = "konto 999";
        let e_before = entity_in(before, "999", EntityType::Phone, 0.5);
        let boosted_before =
            enhancer.enhance(&e_before, before, &words, Language::De, &empty_deny());

        let after = "999 konto";
        let e_after = entity_in(after, "999", EntityType::Phone, 0.5);
        let boosted_after = enhancer.enhance(&e_after, after, &words, Language::De, &empty_deny());

        assert!(boosted_before.entity.confidence > boosted_after.entity.confidence);
    }

    #[test]
    fn test_negative_word_lowers_confidence() {
        let text = "Musterstrasse 12, no person here";
        let entity = entity_in(text, "Musterstrasse", EntityType::Name, 0.6);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::negative("person")],
            Language::En,
            &empty_deny(),
        );
        assert!(outcome.entity.confidence < 0.6);
        assert!(!outcome.skipped);
    }

    #[test]
    fn test_positive_net_boost_floors_at_min_score() {
        let text = "iban 7";
        let entity = entity_in(text, "7", EntityType::Iban, 0.05);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::positive("iban").with_weight(0.05)],
            Language::En,
            &empty_deny(),
        );
        assert!((outcome.entity.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_lemmatized_window_word_matches_context_word() {
        // "company" is not a substring of "companies"; only the shared lemma
        // can produce this hit
        let text = "registered companies follow: 4455";
        let entity = entity_in(text, "4455", EntityType::Phone, 0.5);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::positive("company")],
            Language::En,
            &empty_deny(),
        );
        assert!(outcome.entity.confidence > 0.5);
    }

    #[test]
    fn test_phrase_context_word_matches_as_substring() {
        let text = "Invoice No: 778899 due at once";
        let entity = entity_in(text, "778899", EntityType::Phone, 0.5);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::positive("invoice no")],
            Language::En,
            &empty_deny(),
        );
        assert!(outcome.entity.confidence > 0.5);
    }

    #[test]
    fn test_denied_entity_is_skipped_with_unchanged_confidence() {
        let deny = DenyList::compile(&DenyListConfig {
            global: DenyScopeConfig {
                terms: vec!["musterstrasse".to_string()],
                patterns: vec![],
            },
            ..Default::default()
        });
        let text = "name name name Musterstrasse name name";
        let entity = entity_in(text, "Musterstrasse", EntityType::Name, 0.33);
        let outcome = ContextEnhancer::new().enhance(
            &entity,
            text,
            &[ContextWord::positive("name").with_weight(9.0)],
            Language::De,
            &deny,
        );
        assert!(outcome.skipped);
        assert_eq!(outcome.entity.confidence, 0.33);
        assert_eq!(
            outcome.entity.metadata.get("context_skipped"),
            Some(&json!(true))
        );
    }

    #[test]
    fn test_window_slicing_respects_char_boundaries() {
        let text = "müüüüüller überweisung: 42";
        let entity = entity_in(text, "42", EntityType::Phone, 0.5);
        // must not panic on multi-byte boundaries whatever the window
        for window in 0..30 {
            let enhancer = ContextEnhancer::new().with_settings(
                EntityType::Phone,
                EnhancerSettings {
                    window,
                    ..EnhancerSettings::default()
                },
            );
            enhancer.enhance(
                &entity,
                text,
                &[ContextWord::positive("überweisung")],
                Language::De,
                &empty_deny(),
            );
        }
    }
}
