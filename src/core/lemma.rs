//! Language-aware suffix stripping
//!
//! A small stemmer used only by the context scorer to compare window words
//! against configured context words independent of inflection. It is not a
//! linguistic lemmatizer: both sides of a comparison run through the same
//! rules, so the stems only need to agree, not to be dictionary forms.

use crate::domain::Language;

/// One suffix rule: strip `suffix`, append `replace`, keep at least
/// `min_stem` characters before the suffix
struct SuffixRule {
    suffix: &'static str,
    replace: &'static str,
    min_stem: usize,
}

const EN_RULES: &[SuffixRule] = &[
    SuffixRule { suffix: "sses", replace: "ss", min_stem: 2 },
    SuffixRule { suffix: "ies", replace: "y", min_stem: 2 },
    SuffixRule { suffix: "ing", replace: "", min_stem: 4 },
    SuffixRule { suffix: "ed", replace: "", min_stem: 3 },
    SuffixRule { suffix: "es", replace: "e", min_stem: 3 },
    SuffixRule { suffix: "s", replace: "", min_stem: 3 },
];

const FR_RULES: &[SuffixRule] = &[
    SuffixRule { suffix: "eaux", replace: "eau", min_stem: 1 },
    SuffixRule { suffix: "aux", replace: "al", min_stem: 2 },
    SuffixRule { suffix: "es", replace: "e", min_stem: 3 },
    SuffixRule { suffix: "s", replace: "", min_stem: 3 },
];

const DE_RULES: &[SuffixRule] = &[
    SuffixRule { suffix: "en", replace: "", min_stem: 4 },
    SuffixRule { suffix: "er", replace: "", min_stem: 4 },
    SuffixRule { suffix: "e", replace: "", min_stem: 4 },
    SuffixRule { suffix: "n", replace: "", min_stem: 4 },
    SuffixRule { suffix: "s", replace: "", min_stem: 4 },
];

/// Suffix-stripping stemmer for EN/FR/DE
#[derive(Debug, Default, Clone, Copy)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce `word` to a lowercase stem for the given language
    ///
    /// English and French apply the first matching rule once; German strips
    /// iteratively because its plural and case endings stack (`nummern` →
    /// `nummer` → `numm`, matching `nummer` → `numm`).
    pub fn lemma(&self, word: &str, language: Language) -> String {
        let lower = word.to_lowercase();
        match language {
            Language::En => apply_once(&lower, EN_RULES),
            Language::Fr => apply_once(&lower, FR_RULES),
            Language::De => apply_fixpoint(&lower, DE_RULES),
        }
    }
}

fn apply_once(word: &str, rules: &[SuffixRule]) -> String {
    for rule in rules {
        if let Some(stemmed) = try_rule(word, rule) {
            return stemmed;
        }
    }
    word.to_string()
}

fn apply_fixpoint(word: &str, rules: &[SuffixRule]) -> String {
    let mut current = word.to_string();
    loop {
        let mut changed = false;
        for rule in rules {
            if let Some(stemmed) = try_rule(&current, rule) {
                current = stemmed;
                changed = true;
                break;
            }
        }
        if !changed {
            return current;
        }
    }
}

fn try_rule(word: &str, rule: &SuffixRule) -> Option<String> {
    let stem = word.strip_suffix(rule.suffix)?;
    if stem.chars().count() < rule.min_stem {
        return None;
    }
    // a bare plural 's' after a double-s is never an inflection
    if rule.suffix == "s" && rule.replace.is_empty() && stem.ends_with('s') {
        return None;
    }
    Some(format!("{stem}{}", rule.replace))
}
