//! Document input and classification models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported document languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,
    /// French
    Fr,
    /// German
    De,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::De => "de",
        }
    }

    /// Parse an ISO 639-1 code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            "de" => Some(Self::De),
            _ => None,
        }
    }

    /// All supported languages
    pub fn all() -> &'static [Language] {
        &[Self::En, Self::Fr, Self::De]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

/// Business document categories the classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Invoice,
    Letter,
    Form,
    Contract,
    Report,
    Unknown,
}

impl DocumentType {
    /// Get the wire label for the document type
    pub fn label(&self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Letter => "LETTER",
            Self::Form => "FORM",
            Self::Contract => "CONTRACT",
            Self::Report => "REPORT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire label, case-insensitive
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "INVOICE" => Some(Self::Invoice),
            "LETTER" => Some(Self::Letter),
            "FORM" => Some(Self::Form),
            "CONTRACT" => Some(Self::Contract),
            "REPORT" => Some(Self::Report),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The classifiable types, excluding `Unknown`
    pub fn candidates() -> &'static [DocumentType] {
        &[
            Self::Invoice,
            Self::Letter,
            Self::Form,
            Self::Contract,
            Self::Report,
        ]
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single document submitted for detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Caller-supplied or generated identifier
    pub id: String,
    /// Raw document text
    pub text: String,
    /// Optional language hint, used when the stop-word vote is inconclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_hint: Option<Language>,
}

impl DocumentInput {
    /// Create a document with a generated UUID identifier
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            language_hint: None,
        }
    }

    /// Set the document identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the language hint
    pub fn with_language_hint(mut self, language: Language) -> Self {
        self.language_hint = Some(language);
        self
    }
}

/// One piece of evidence the classifier recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationFeature {
    /// Signal name, e.g. `keyword:rechnung` or `structure:salutation`
    pub name: String,
    /// Contribution to the document type score
    pub weight: f64,
    /// The text that triggered the signal, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    /// Byte offset of the match, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// Result of document classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentClassification {
    /// Winning document type, `Unknown` when nothing clears the floor
    pub document_type: DocumentType,
    /// Capped score of the winning type
    pub confidence: f64,
    /// Runner-up type when its score is strong enough to matter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_type: Option<DocumentType>,
    /// Language chosen by the stop-word vote
    pub language: Language,
    /// Evidence that produced the scores
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<ClassificationFeature>,
}

impl DocumentClassification {
    /// Classification for a document nothing matched
    pub fn unknown(language: Language) -> Self {
        Self {
            document_type: DocumentType::Unknown,
            confidence: 0.0,
            secondary_type: None,
            language,
            features: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_round_trip() {
        for lang in Language::all() {
            assert_eq!(Language::from_code(lang.code()), Some(*lang));
        }
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code("it"), None);
    }

    #[test]
    fn test_document_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&DocumentType::Invoice).unwrap();
        assert_eq!(json, "\"INVOICE\"");
    }

    #[test]
    fn test_candidates_exclude_unknown() {
        assert!(!DocumentType::candidates().contains(&DocumentType::Unknown));
        assert_eq!(DocumentType::candidates().len(), 5);
    }

    #[test]
    fn test_document_type_label_round_trip() {
        for doc_type in DocumentType::candidates() {
            assert_eq!(DocumentType::from_label(doc_type.label()), Some(*doc_type));
        }
        assert_eq!(DocumentType::from_label("invoice"), Some(DocumentType::Invoice));
        assert_eq!(DocumentType::from_label("MEMO"), None);
    }

    #[test]
    fn test_document_input_generates_id() {
        let doc = DocumentInput::new("some text");
        assert!(!doc.id.is_empty());
        assert_eq!(doc.text, "some text");
        assert!(doc.language_hint.is_none());
    }

    #[test]
    fn test_document_input_builder() {
        let doc = DocumentInput::new("text")
            .with_id("doc-1")
            .with_language_hint(Language::De);
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.language_hint, Some(Language::De));
    }

    #[test]
    fn test_unknown_classification() {
        let c = DocumentClassification::unknown(Language::Fr);
        assert_eq!(c.document_type, DocumentType::Unknown);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.language, Language::Fr);
    }
}
