//! Static word lists backing the document classifier
//!
//! Stop-word sets drive the language vote; keyword lists carry the
//! per-type evidence. All entries are lowercase.

use crate::domain::{DocumentType, Language};

pub(crate) fn stop_words(language: Language) -> &'static [&'static str] {
    match language {
        Language::En => &[
            "the", "be", "to", "of", "and", "that", "have", "for", "not", "with", "you", "this",
            "but", "his", "her", "from", "they", "will", "would", "there", "their", "what", "about",
            "which", "when", "your", "can", "has", "been", "were", "are", "was",
        ],
        Language::Fr => &[
            "le", "la", "les", "de", "des", "du", "un", "une", "et", "est", "que", "qui", "dans",
            "pour", "pas", "sur", "ne", "se", "ce", "cette", "il", "elle", "nous", "vous", "aux",
            "avec", "son", "ses", "mais", "ou", "par", "sont", "être", "votre",
        ],
        Language::De => &[
            "der", "die", "das", "und", "ist", "den", "von", "zu", "mit", "sich", "des", "auf",
            "für", "nicht", "ein", "eine", "als", "auch", "es", "werden", "aus", "er", "hat",
            "dass", "sie", "nach", "wird", "bei", "um", "am", "sind", "oder", "einen", "dem",
        ],
    }
}

pub(crate) fn keywords(doc_type: DocumentType, language: Language) -> &'static [&'static str] {
    match (doc_type, language) {
        (DocumentType::Invoice, Language::En) => &[
            "invoice", "total", "amount", "payment", "due", "subtotal", "billing", "remittance",
            "payable", "vat",
        ],
        (DocumentType::Invoice, Language::Fr) => &[
            "facture", "montant", "total", "paiement", "échéance", "tva", "règlement", "payer",
        ],
        (DocumentType::Invoice, Language::De) => &[
            "rechnung", "betrag", "gesamtbetrag", "zahlung", "fällig", "mwst", "zahlbar",
            "rechnungsnummer", "überweisung",
        ],
        (DocumentType::Letter, Language::En) => &[
            "dear", "sincerely", "regards", "yours", "faithfully", "writing", "enquiry",
        ],
        (DocumentType::Letter, Language::Fr) => &[
            "madame", "monsieur", "cordialement", "salutations", "veuillez", "agréer",
            "distinguées",
        ],
        (DocumentType::Letter, Language::De) => &[
            "geehrte", "geehrter", "freundlichen", "grüssen", "grüßen", "hochachtungsvoll",
            "anliegen",
        ],
        (DocumentType::Form, Language::En) => &[
            "form", "field", "applicant", "application", "required", "complete", "checkbox",
            "tick", "submit",
        ],
        (DocumentType::Form, Language::Fr) => &[
            "formulaire", "demande", "remplir", "cocher", "champ", "requis", "soumettre",
        ],
        (DocumentType::Form, Language::De) => &[
            "formular", "antrag", "ausfüllen", "ankreuzen", "feld", "zutreffendes", "pflichtfeld",
        ],
        (DocumentType::Contract, Language::En) => &[
            "agreement", "contract", "party", "parties", "clause", "hereinafter", "terms",
            "obligations", "governed", "termination",
        ],
        (DocumentType::Contract, Language::Fr) => &[
            "contrat", "parties", "clause", "article", "conditions", "engagement", "résiliation",
            "soussigné",
        ],
        (DocumentType::Contract, Language::De) => &[
            "vertrag", "parteien", "klausel", "bedingungen", "kündigung", "vereinbarung",
            "haftung", "vertragspartner",
        ],
        (DocumentType::Report, Language::En) => &[
            "report", "summary", "analysis", "findings", "results", "quarter", "overview",
            "conclusion",
        ],
        (DocumentType::Report, Language::Fr) => &[
            "rapport", "résumé", "analyse", "résultats", "conclusion", "trimestre", "synthèse",
        ],
        (DocumentType::Report, Language::De) => &[
            "bericht", "zusammenfassung", "analyse", "ergebnisse", "quartal", "fazit",
            "übersicht", "auswertung",
        ],
        (DocumentType::Unknown, _) => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_word_sets_are_large_enough_to_vote() {
        for lang in Language::all() {
            assert!(stop_words(*lang).len() >= 30, "{lang} set too small");
        }
    }

    #[test]
    fn test_every_candidate_type_has_keywords_per_language() {
        for doc_type in DocumentType::candidates() {
            for lang in Language::all() {
                assert!(
                    !keywords(*doc_type, *lang).is_empty(),
                    "no keywords for {doc_type}/{lang}"
                );
            }
        }
    }

    #[test]
    fn test_lexicon_entries_are_lowercase() {
        for lang in Language::all() {
            for word in stop_words(*lang) {
                assert_eq!(*word, word.to_lowercase(), "stop word {word}");
            }
            for doc_type in DocumentType::candidates() {
                for word in keywords(*doc_type, *lang) {
                    assert_eq!(*word, word.to_lowercase(), "keyword {word}");
                }
            }
        }
    }
}
