//! Document type and language classification
//!
//! Classification runs once per document on the normalized text. Language
//! comes from a stop-word vote; the document type from keyword evidence
//! plus a handful of structural signals (salutations, invoice number
//! lines, clause headers, field-row density) with position-aware boosts.
//! Every contributing signal lands in the result's `features` so the
//! decision can be audited afterwards.

mod lexicon;

use crate::domain::{
    ClassificationFeature, DocumentClassification, DocumentType, Language,
};
use regex::Regex;
use std::collections::HashMap;

/// Tunable thresholds for the classifier
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Floor the winning score must clear, otherwise `Unknown`
    pub min_confidence: f64,
    /// Floor for reporting a runner-up as `secondary_type`
    pub secondary_threshold: f64,
    /// Base contribution of a single matched keyword
    pub keyword_base: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.25,
            secondary_threshold: 0.2,
            keyword_base: 0.08,
        }
    }
}

/// Where in the document a structural signal earns its boost
#[derive(Debug, Clone, Copy)]
enum BoostZone {
    /// First `fraction` of the text
    Head(f64),
    /// Last `fraction` of the text
    Tail(f64),
}

impl BoostZone {
    fn contains(self, position: usize, text_len: usize) -> bool {
        if text_len == 0 {
            return false;
        }
        let fraction = position as f64 / text_len as f64;
        match self {
            Self::Head(f) => fraction <= f,
            Self::Tail(f) => fraction >= 1.0 - f,
        }
    }
}

struct StructuralSignal {
    name: &'static str,
    doc_type: DocumentType,
    regex: Regex,
    weight: f64,
    boost_zone: BoostZone,
    boost: f64,
}

/// Classifies documents by type and language
pub struct DocumentClassifier {
    signals: Vec<StructuralSignal>,
    field_row: Regex,
    checkbox_row: Regex,
    clause_header: Regex,
    settings: ClassifierSettings,
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentClassifier {
    pub fn new() -> Self {
        Self::with_settings(ClassifierSettings::default())
    }

    pub fn with_settings(settings: ClassifierSettings) -> Self {
        let signals = vec![
            StructuralSignal {
                name: "invoice_number_line",
                doc_type: DocumentType::Invoice,
                regex: Regex::new(
                    r"(?im)^\s*(?:invoice|rechnung|facture)\s*(?:no\.?|nr\.?|number|nummer|n°)?\s*[:#]?\s*[A-Za-z0-9][A-Za-z0-9/-]*",
                )
                .unwrap(),
                weight: 0.25,
                boost_zone: BoostZone::Head(0.2),
                boost: 0.1,
            },
            StructuralSignal {
                name: "total_amount_line",
                doc_type: DocumentType::Invoice,
                regex: Regex::new(
                    r"(?im)^\s*(?:total|gesamtbetrag|zahlbetrag|montant\s+(?:total|dû)|amount\s+due|invoice\s+total)\b[^\n]*\d",
                )
                .unwrap(),
                weight: 0.2,
                boost_zone: BoostZone::Head(0.2),
                boost: 0.1,
            },
            StructuralSignal {
                name: "salutation",
                doc_type: DocumentType::Letter,
                regex: Regex::new(
                    r"(?im)^\s*(?:dear\s+\p{L}|sehr\s+geehrte|madame\s*,\s*monsieur|madame\b|monsieur\b|chère?\s+\p{L})",
                )
                .unwrap(),
                weight: 0.3,
                boost_zone: BoostZone::Head(0.05),
                boost: 0.15,
            },
            StructuralSignal {
                name: "signature_block",
                doc_type: DocumentType::Letter,
                regex: Regex::new(
                    r"(?im)^\s*(?:sincerely|best\s+regards|kind\s+regards|yours\s+(?:sincerely|faithfully|truly)|mit\s+freundlichen\s+grü(?:ß|ss)en|freundliche\s+grü(?:ß|ss)e|hochachtungsvoll|(?:bien\s+|très\s+)?cordialement|meilleures\s+salutations|sincères\s+salutations)",
                )
                .unwrap(),
                weight: 0.25,
                boost_zone: BoostZone::Tail(0.2),
                boost: 0.1,
            },
        ];
        Self {
            signals,
            field_row: Regex::new(r"(?m)^[^\n:]{1,48}:[ \t]*(?:_{3,}|\.{4,})?[ \t]*$").unwrap(),
            checkbox_row: Regex::new(r"(?m)^[ \t]*(?:\[[ xX]?\]|☐|☑)").unwrap(),
            clause_header: Regex::new(
                r"(?m)^\s*(?:§\s*\d+|(?i:article|artikel|clause|abschnitt|section)\s+\d+|\d+(?:\.\d+)*\.?\s+\p{Lu})",
            )
            .unwrap(),
            settings,
        }
    }

    /// Resolve the working language for `text` without scoring types
    ///
    /// Same stop-word vote `classify` uses, exposed so earlier passes
    /// (context windows, deny-list scopes) agree with the classification's
    /// language.
    pub fn detect_language(&self, text: &str, language_hint: Option<Language>) -> Language {
        let lower = text.to_lowercase();
        let mut word_counts: HashMap<&str, usize> = HashMap::new();
        for word in lower.split(|c: char| !c.is_alphanumeric()) {
            if !word.is_empty() {
                *word_counts.entry(word).or_default() += 1;
            }
        }
        vote_language(&word_counts)
            .or(language_hint)
            .unwrap_or_default()
    }

    /// Classify `text`, preferring the stop-word vote over `language_hint`
    pub fn classify(&self, text: &str, language_hint: Option<Language>) -> DocumentClassification {
        if text.trim().is_empty() {
            return DocumentClassification::unknown(language_hint.unwrap_or_default());
        }

        let lower = text.to_lowercase();
        let mut word_counts: HashMap<&str, usize> = HashMap::new();
        for word in lower.split(|c: char| !c.is_alphanumeric()) {
            if !word.is_empty() {
                *word_counts.entry(word).or_default() += 1;
            }
        }

        let language = vote_language(&word_counts)
            .or(language_hint)
            .unwrap_or_default();

        let mut scores: HashMap<DocumentType, f64> = HashMap::new();
        let mut features = Vec::new();

        for doc_type in DocumentType::candidates() {
            let mut score = 0.0;
            for keyword in lexicon::keywords(*doc_type, language) {
                let count = word_counts.get(keyword).copied().unwrap_or(0);
                if count == 0 {
                    continue;
                }
                let contribution =
                    self.settings.keyword_base * length_factor(keyword) * count_factor(count);
                score += contribution;
                features.push(ClassificationFeature {
                    name: format!("{}:keyword:{keyword}", doc_type.label()),
                    weight: contribution,
                    matched_text: Some((*keyword).to_string()),
                    position: lower.find(keyword),
                });
            }
            scores.insert(*doc_type, score);
        }

        for signal in &self.signals {
            if let Some(m) = signal.regex.find(text) {
                let mut weight = signal.weight;
                if signal.boost_zone.contains(m.start(), text.len()) {
                    weight += signal.boost;
                }
                *scores.entry(signal.doc_type).or_default() += weight;
                features.push(ClassificationFeature {
                    name: format!("{}:structure:{}", signal.doc_type.label(), signal.name),
                    weight,
                    matched_text: Some(m.as_str().trim().to_string()),
                    position: Some(m.start()),
                });
            }
        }

        let row_count =
            self.field_row.find_iter(text).count() + self.checkbox_row.find_iter(text).count();
        if row_count >= 3 {
            let weight = (0.15 + 0.05 * row_count as f64).min(0.45);
            *scores.entry(DocumentType::Form).or_default() += weight;
            features.push(ClassificationFeature {
                name: format!("{}:structure:field_rows", DocumentType::Form.label()),
                weight,
                matched_text: None,
                position: self.field_row.find(text).map(|m| m.start()),
            });
        }

        let clause_count = self.clause_header.find_iter(text).count();
        if clause_count >= 2 {
            let weight = (0.1 + 0.08 * clause_count as f64).min(0.4);
            *scores.entry(DocumentType::Contract).or_default() += weight;
            features.push(ClassificationFeature {
                name: format!("{}:structure:clause_headers", DocumentType::Contract.label()),
                weight,
                matched_text: None,
                position: self.clause_header.find(text).map(|m| m.start()),
            });
        }

        let mut ranked: Vec<(DocumentType, f64)> = DocumentType::candidates()
            .iter()
            .map(|t| (*t, scores.get(t).copied().unwrap_or(0.0).min(1.0)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (winner, winner_score) = ranked[0];
        let document_type = if winner_score >= self.settings.min_confidence {
            winner
        } else {
            DocumentType::Unknown
        };
        let secondary_type = (document_type != DocumentType::Unknown
            && ranked[1].1 > self.settings.secondary_threshold)
            .then_some(ranked[1].0);

        DocumentClassification {
            document_type,
            confidence: winner_score,
            secondary_type,
            language,
            features,
        }
    }
}

/// Count stop-word hits per language; the highest count wins, a tie or an
/// empty tally abstains.
fn vote_language(word_counts: &HashMap<&str, usize>) -> Option<Language> {
    let mut tallies: Vec<(Language, usize)> = Language::all()
        .iter()
        .map(|lang| {
            let hits = lexicon::stop_words(*lang)
                .iter()
                .map(|w| word_counts.get(w).copied().unwrap_or(0))
                .sum();
            (*lang, hits)
        })
        .collect();
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    if tallies[0].1 == 0 || tallies[0].1 == tallies[1].1 {
        return None;
    }
    Some(tallies[0].0)
}

fn length_factor(keyword: &str) -> f64 {
    let len = keyword.chars().count();
    (1.0 + 0.08 * len.saturating_sub(4) as f64).min(2.0)
}

fn count_factor(count: usize) -> f64 {
    1.0 + (count as f64 + 1.0).log2() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DocumentClassifier {
        DocumentClassifier::new()
    }

    #[test]
    fn test_detect_language_agrees_with_classify() {
        let text = "Sehr geehrte Damen und Herren, wir bedanken uns für die \
                    Zusammenarbeit und verbleiben mit freundlichen Grüßen";
        let c = classifier();
        assert_eq!(c.detect_language(text, None), Language::De);
        assert_eq!(c.classify(text, None).language, Language::De);
    }

    #[test]
    fn test_detect_language_falls_back_to_hint() {
        let c = classifier();
        assert_eq!(c.detect_language("756.1234.5678.97", Some(Language::Fr)), Language::Fr);
        assert_eq!(c.detect_language("756.1234.5678.97", None), Language::En);
    }

    #[test]
    fn test_german_invoice() {
        let text = "Rechnung Nr. 2024-001\n\
                    Datum: 15.03.2024\n\
                    Die Lieferung erfolgt auf der Grundlage der vereinbarten Konditionen.\n\
                    Gesamtbetrag: CHF 1'250.00\n\
                    Der Betrag ist zahlbar innert 30 Tagen. MwSt inbegriffen.";
        let result = classifier().classify(text, None);
        assert_eq!(result.document_type, DocumentType::Invoice);
        assert_eq!(result.language, Language::De);
        assert!(result.confidence >= 0.25);
        assert!(result
            .features
            .iter()
            .any(|f| f.name == "INVOICE:structure:invoice_number_line"));
    }

    #[test]
    fn test_english_letter() {
        let text = "Dear Mr. Smith,\n\n\
                    I am writing to inform you about the changes to your account.\n\n\
                    Sincerely,\nJohn";
        let result = classifier().classify(text, None);
        assert_eq!(result.document_type, DocumentType::Letter);
        assert_eq!(result.language, Language::En);
        assert!(result
            .features
            .iter()
            .any(|f| f.name == "LETTER:structure:salutation"));
    }

    #[test]
    fn test_salutation_boost_applies_at_document_start() {
        let at_start = classifier().classify("Dear Anna,\nthanks for the update.", None);
        let salutation = at_start
            .features
            .iter()
            .find(|f| f.name == "LETTER:structure:salutation")
            .expect("salutation feature");
        assert!((salutation.weight - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_form_field_density() {
        let text = "Antragsformular\n\
                    Name: ____________\n\
                    Vorname: ____________\n\
                    Adresse: ____________\n\
                    [ ] Ich akzeptiere die Bedingungen\n\
                    Bitte das Formular vollständig ausfüllen und ankreuzen was zutrifft.";
        let result = classifier().classify(text, Some(Language::De));
        assert_eq!(result.document_type, DocumentType::Form);
        assert!(result
            .features
            .iter()
            .any(|f| f.name == "FORM:structure:field_rows"));
    }

    #[test]
    fn test_contract_clause_headers() {
        let text = "Vertrag zwischen den Parteien\n\
                    § 1 Gegenstand\n\
                    Die Parteien vereinbaren die folgenden Bedingungen.\n\
                    § 2 Haftung\n\
                    Die Haftung richtet sich nach diesem Vertrag.\n\
                    § 3 Kündigung";
        let result = classifier().classify(text, None);
        assert_eq!(result.document_type, DocumentType::Contract);
        assert_eq!(result.language, Language::De);
        assert!(result
            .features
            .iter()
            .any(|f| f.name == "CONTRACT:structure:clause_headers"));
    }

    #[test]
    fn test_unclassifiable_text_is_unknown() {
        let result = classifier().classify("zzz qqq 12345 xyz", None);
        assert_eq!(result.document_type, DocumentType::Unknown);
        assert!(result.confidence < 0.25);
    }

    #[test]
    fn test_empty_text_is_unknown_with_hint_language() {
        let result = classifier().classify("   ", Some(Language::Fr));
        assert_eq!(result.document_type, DocumentType::Unknown);
        assert_eq!(result.language, Language::Fr);
    }

    #[test]
    fn test_vote_falls_back_to_hint_then_english() {
        // No stop words at all, so the vote abstains.
        let hinted = classifier().classify("Rechnung 12345", Some(Language::De));
        assert_eq!(hinted.language, Language::De);
        let unhinted = classifier().classify("Rechnung 12345", None);
        assert_eq!(unhinted.language, Language::En);
    }

    #[test]
    fn test_french_language_vote() {
        let text = "Nous vous prions de bien vouloir régler le montant de la facture \
                    dans les meilleurs délais. Le paiement est attendu pour la fin du mois.";
        let result = classifier().classify(text, None);
        assert_eq!(result.language, Language::Fr);
    }

    #[test]
    fn test_length_factor_rewards_specific_keywords() {
        assert!((length_factor("dear") - 1.0).abs() < 1e-9);
        assert!((length_factor("invoice") - 1.24).abs() < 1e-9);
        assert!((length_factor("rechnungsnummer") - 1.88).abs() < 1e-9);
        assert_eq!(length_factor(&"x".repeat(40)), 2.0);
    }

    #[test]
    fn test_count_factor_dampens_repeats() {
        assert!((count_factor(1) - 1.5).abs() < 1e-9);
        assert!((count_factor(3) - 2.0).abs() < 1e-9);
        assert!(count_factor(100) < count_factor(50) * 2.0);
    }

    #[test]
    fn test_secondary_type_reported() {
        let text = "Invoice INV-2024-117\n\
                    Total amount due: 980.00\n\
                    This invoice forms part of the agreement between the parties, \
                    and the contract terms in each clause govern the payment obligations.";
        let result = classifier().classify(text, None);
        assert_eq!(result.document_type, DocumentType::Invoice);
        assert_eq!(result.secondary_type, Some(DocumentType::Contract));
    }
}
