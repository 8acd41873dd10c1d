//! Token stitching and candidate-stream fusion
//!
//! The inference service returns BIO-labeled subword tokens; this module
//! stitches them into `Ml` entities and folds them into the regex stream.
//! Fusion of an overlapping same-type pair keeps the regex span (rule
//! patterns delimit cleanly, model tokenizers often do not) and rewards
//! the agreement with a confidence bump.

use crate::adapters::ner::NerToken;
use crate::domain::{DetectionSource, Entity, EntityType};

/// Model label → domain entity type
fn entity_type_for_label(label: &str) -> Option<EntityType> {
    match label {
        "PER" => Some(EntityType::Name),
        "LOC" => Some(EntityType::Location),
        "ORG" => Some(EntityType::Organization),
        _ => None,
    }
}

struct Run<'a> {
    label: &'a str,
    start: usize,
    end: usize,
    scores: Vec<f64>,
}

impl<'a> Run<'a> {
    fn open(label: &'a str, token: &NerToken) -> Self {
        Self {
            label,
            start: token.start,
            end: token.end,
            scores: vec![token.score],
        }
    }

    fn extend(&mut self, token: &NerToken) {
        self.end = self.end.max(token.end);
        self.scores.push(token.score);
    }
}

/// Stitch BIO tokens into entities
///
/// `B-X` opens a run, `I-X` of the same type extends it, anything else
/// closes it. A finished run re-slices its text from `text` (subword
/// artifacts in `token.text` are ignored), averages the token scores and
/// is dropped when the slice is shorter than two chars or the label has
/// no domain mapping.
pub fn stitch_tokens(tokens: &[NerToken], text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut run: Option<Run> = None;

    for token in tokens {
        match token.bio_parts() {
            Some(("B", label)) => {
                finish_run(run.take(), text, &mut entities);
                run = Some(Run::open(label, token));
            }
            Some(("I", label)) if run.as_ref().is_some_and(|r| r.label == label) => {
                if let Some(r) = run.as_mut() {
                    r.extend(token);
                }
            }
            _ => finish_run(run.take(), text, &mut entities),
        }
    }
    finish_run(run.take(), text, &mut entities);
    entities
}

fn finish_run(run: Option<Run>, text: &str, entities: &mut Vec<Entity>) {
    let Some(run) = run else { return };
    let Some(entity_type) = entity_type_for_label(run.label) else {
        tracing::debug!(label = run.label, "dropping run with unmapped label");
        return;
    };
    let Some(slice) = text.get(run.start..run.end) else {
        tracing::debug!(
            start = run.start,
            end = run.end,
            "dropping run with offsets outside the submitted text"
        );
        return;
    };
    if slice.chars().count() < 2 {
        return;
    }
    let confidence = run.scores.iter().sum::<f64>() / run.scores.len() as f64;
    entities.push(Entity::new(
        slice,
        entity_type,
        run.start,
        run.end,
        confidence,
        DetectionSource::Ml,
    ));
}

/// Fold ML entities into the regex stream
///
/// An ML entity overlapping a same-type rule entity merges into it:
/// `source = Both`, the rule span wins, and the confidence becomes
/// `min(1.0, max(rule, ml) × 1.1)`. Everything else appends. The result
/// is sorted by start offset.
pub fn fuse(rule_entities: Vec<Entity>, ml_entities: Vec<Entity>) -> Vec<Entity> {
    let mut fused = rule_entities;
    for ml in ml_entities {
        let overlap = fused
            .iter_mut()
            .find(|rule| rule.entity_type == ml.entity_type && rule.overlaps(&ml));
        match overlap {
            Some(rule) => {
                let confidence = (rule.confidence.max(ml.confidence) * 1.1).min(1.0);
                rule.set_confidence(confidence);
                rule.source = DetectionSource::Both;
                rule.annotate("ml_confidence", serde_json::json!(ml.confidence));
            }
            None => fused.push(ml),
        }
    }
    fused.sort_by_key(|e| (e.start, e.end));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, label: &str, score: f64, start: usize, end: usize) -> NerToken {
        NerToken {
            text: text.into(),
            label: label.into(),
            score,
            start,
            end,
        }
    }

    #[test]
    fn test_stitches_adjacent_person_tokens() {
        let text = "Anna Keller wohnt in Bern.";
        let tokens = vec![
            token("Anna", "B-PER", 0.99, 0, 4),
            token("Keller", "I-PER", 0.97, 5, 11),
        ];
        let entities = stitch_tokens(&tokens, text);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Anna Keller");
        assert_eq!(entities[0].entity_type, EntityType::Name);
        assert_eq!(entities[0].source, DetectionSource::Ml);
        assert!((entities[0].confidence - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_reslices_from_submitted_text_despite_subword_artifacts() {
        let text = "Frau Müller";
        let tokens = vec![
            token("Mü", "B-PER", 0.9, 5, 8),
            token("##ller", "I-PER", 0.8, 8, 12),
        ];
        let entities = stitch_tokens(&tokens, text);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Müller");
    }

    #[test]
    fn test_mismatched_inside_tag_closes_run() {
        let text = "Anna Siemens";
        let tokens = vec![
            token("Anna", "B-PER", 0.9, 0, 4),
            token("Siemens", "I-ORG", 0.8, 5, 12),
        ];
        let entities = stitch_tokens(&tokens, text);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Anna");
    }

    #[test]
    fn test_outside_tag_separates_runs() {
        let text = "Bern und Basel";
        let tokens = vec![
            token("Bern", "B-LOC", 0.95, 0, 4),
            token("und", "O", 0.99, 5, 8),
            token("Basel", "B-LOC", 0.93, 9, 14),
        ];
        let entities = stitch_tokens(&tokens, text);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Bern");
        assert_eq!(entities[1].text, "Basel");
        assert!(entities
            .iter()
            .all(|e| e.entity_type == EntityType::Location));
    }

    #[test]
    fn test_unmapped_label_is_dropped() {
        let text = "some miscellaneous thing";
        let tokens = vec![token("miscellaneous", "B-MISC", 0.9, 5, 18)];
        assert!(stitch_tokens(&tokens, text).is_empty());
    }

    #[test]
    fn test_single_char_run_is_dropped() {
        let text = "A meeting";
        let tokens = vec![token("A", "B-PER", 0.9, 0, 1)];
        assert!(stitch_tokens(&tokens, text).is_empty());
    }

    #[test]
    fn test_out_of_bounds_offsets_are_dropped() {
        let tokens = vec![token("ghost", "B-PER", 0.9, 90, 99)];
        assert!(stitch_tokens(&tokens, "short").is_empty());
    }

    #[test]
    fn test_dangling_inside_tag_opens_nothing() {
        let text = "stray Keller";
        let tokens = vec![token("Keller", "I-PER", 0.9, 6, 12)];
        assert!(stitch_tokens(&tokens, text).is_empty());
    }

    fn rule_entity(ty: EntityType, start: usize, end: usize, conf: f64) -> Entity {
        Entity::new("x".repeat(end - start), ty, start, end, conf, DetectionSource::Rule)
    }

    fn ml_entity(ty: EntityType, start: usize, end: usize, conf: f64) -> Entity {
        Entity::new("y".repeat(end - start), ty, start, end, conf, DetectionSource::Ml)
    }

    #[test]
    fn test_fusion_rewards_agreement() {
        let fused = fuse(
            vec![rule_entity(EntityType::Email, 10, 19, 0.7)],
            vec![ml_entity(EntityType::Email, 10, 19, 0.6)],
        );
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].source, DetectionSource::Both);
        assert!((fused[0].confidence - 0.77).abs() < 1e-9);
        assert_eq!(
            fused[0].metadata.get("ml_confidence"),
            Some(&serde_json::json!(0.6))
        );
    }

    #[test]
    fn test_fusion_keeps_rule_span_on_partial_overlap() {
        let fused = fuse(
            vec![rule_entity(EntityType::Name, 10, 19, 0.5)],
            vec![ml_entity(EntityType::Name, 8, 21, 0.9)],
        );
        assert_eq!(fused.len(), 1);
        assert_eq!((fused[0].start, fused[0].end), (10, 19));
        assert!((fused[0].confidence - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_fusion_confidence_is_capped() {
        let fused = fuse(
            vec![rule_entity(EntityType::Iban, 0, 21, 0.95)],
            vec![ml_entity(EntityType::Iban, 0, 21, 0.5)],
        );
        assert_eq!(fused[0].confidence, 1.0);
    }

    #[test]
    fn test_different_types_do_not_fuse() {
        let fused = fuse(
            vec![rule_entity(EntityType::Email, 10, 19, 0.7)],
            vec![ml_entity(EntityType::Name, 10, 19, 0.6)],
        );
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_non_overlapping_ml_entities_append_sorted() {
        let fused = fuse(
            vec![rule_entity(EntityType::Email, 40, 55, 0.7)],
            vec![ml_entity(EntityType::Name, 0, 11, 0.9)],
        );
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].entity_type, EntityType::Name);
        assert_eq!(fused[1].entity_type, EntityType::Email);
    }
}
