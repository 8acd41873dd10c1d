//! Detected entity data models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Entity type enumeration covering the identifiers Argus detects in
/// EN/FR/DE business documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// Person names (first, middle, last)
    Name,
    /// Company and institution names
    Organization,
    /// Cities, streets, countries
    Location,
    /// Email addresses, including de-obfuscated forms
    Email,
    /// Telephone numbers (CH/DE/FR national and international)
    Phone,
    /// International bank account numbers
    Iban,
    /// Swiss AVS/AHV social insurance numbers (756.XXXX.XXXX.XX)
    SwissAvs,
    /// Calendar dates, numeric and month-name forms
    Date,
    /// Postal codes (CH 4-digit, DE/FR 5-digit)
    PostalCode,
    /// VAT registration numbers (CHE/DE/FR/AT)
    VatId,
}

impl EntityType {
    /// Get the wire label for the entity type
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Organization => "ORGANIZATION",
            Self::Location => "LOCATION",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Iban => "IBAN",
            Self::SwissAvs => "SWISS_AVS",
            Self::Date => "DATE",
            Self::PostalCode => "POSTAL_CODE",
            Self::VatId => "VAT_ID",
        }
    }

    /// Parse a wire label back into an entity type
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NAME" => Some(Self::Name),
            "ORGANIZATION" => Some(Self::Organization),
            "LOCATION" => Some(Self::Location),
            "EMAIL" => Some(Self::Email),
            "PHONE" => Some(Self::Phone),
            "IBAN" => Some(Self::Iban),
            "SWISS_AVS" => Some(Self::SwissAvs),
            "DATE" => Some(Self::Date),
            "POSTAL_CODE" => Some(Self::PostalCode),
            "VAT_ID" => Some(Self::VatId),
            _ => None,
        }
    }

    /// Check if this type has a checksum a validator can verify
    pub fn has_checksum(&self) -> bool {
        matches!(self, Self::Iban | Self::SwissAvs | Self::VatId)
    }

    /// All entity types, in label order
    pub fn all() -> &'static [EntityType] {
        &[
            Self::Name,
            Self::Organization,
            Self::Location,
            Self::Email,
            Self::Phone,
            Self::Iban,
            Self::SwissAvs,
            Self::Date,
            Self::PostalCode,
            Self::VatId,
        ]
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How an entity was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionSource {
    /// Regex pattern matching
    Rule,
    /// Neural named entity recognition
    Ml,
    /// Agreement between rule and ML detection
    Both,
    /// Injected by the caller
    Manual,
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rule => "RULE",
            Self::Ml => "ML",
            Self::Both => "BOTH",
            Self::Manual => "MANUAL",
        };
        f.write_str(s)
    }
}

/// A detected PII entity
///
/// Offsets are byte positions into the text the entity was detected in.
/// While the pipeline runs they refer to the normalized text; the final
/// pass translates them into original-document coordinates before hand-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// The matched text, exactly as sliced from the detection text
    pub text: String,
    /// Entity type
    pub entity_type: EntityType,
    /// Start byte offset, inclusive
    pub start: usize,
    /// End byte offset, exclusive
    pub end: usize,
    /// Confidence score, always within [0.0, 1.0]
    pub confidence: f64,
    /// Detection source
    pub source: DetectionSource,
    /// Free-form annotations accumulated by the passes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Entity {
    /// Create a new entity with a clamped confidence score
    pub fn new(
        text: impl Into<String>,
        entity_type: EntityType,
        start: usize,
        end: usize,
        confidence: f64,
        source: DetectionSource,
    ) -> Self {
        Self {
            text: text.into(),
            entity_type,
            start,
            end,
            confidence: clamp_confidence(confidence),
            source,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the confidence score, clamping to [0.0, 1.0]
    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = clamp_confidence(confidence);
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span is empty
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Midpoint of the span, used for structural zone checks
    pub fn midpoint(&self) -> usize {
        self.start + self.len() / 2
    }

    /// True when this span overlaps `other` (half-open interval test)
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Attach a metadata annotation
    pub fn annotate(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }
}

/// Clamp a confidence score to [0.0, 1.0], mapping NaN to 0.0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
