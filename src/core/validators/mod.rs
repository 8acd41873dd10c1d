//! Format validators
//!
//! One validator per entity type turns a raw pattern match into a graded
//! confidence. Outcomes come from a fixed three-level lattice so validators
//! stay comparable across entity types: `STANDARD` for a fully valid match,
//! `INVALID_FORMAT` for input that does not parse as the claimed type, and
//! `FAILED` for input that parses but breaks a checksum or range rule.
//!
//! Validators never fail as functions; malformed input is a normal outcome
//! (`is_valid = false`). Every implementation bound-checks candidate length
//! before running any pattern work. The registry is built explicitly at
//! pipeline construction and injected; there is no global registration.

pub mod avs;
pub mod date;
pub mod email;
pub mod iban;
pub mod phone;
pub mod postal;
pub mod vat;

pub use avs::AvsValidator;
pub use date::DateValidator;
pub use email::EmailValidator;
pub use iban::IbanValidator;
pub use phone::PhoneValidator;
pub use postal::PostalCodeValidator;
pub use vat::VatValidator;

use crate::domain::{EntityType, ValidationResult};
use std::collections::HashMap;

/// The fixed confidence lattice validators draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationConfidence {
    /// Structurally valid; checksum verified where one exists
    Standard,
    /// Does not parse as the claimed entity type
    InvalidFormat,
    /// Parses, but a checksum or range rule fails
    Failed,
}

impl ValidationConfidence {
    /// The score this lattice level maps to
    pub const fn score(self) -> f64 {
        match self {
            Self::Standard => 0.85,
            Self::InvalidFormat => 0.25,
            Self::Failed => 0.10,
        }
    }

    /// Wire label recorded in entity metadata
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::Failed => "FAILED",
        }
    }

    /// Recover the lattice level from a result's score
    pub fn from_score(score: f64) -> Option<Self> {
        [Self::Standard, Self::InvalidFormat, Self::Failed]
            .into_iter()
            .find(|level| (level.score() - score).abs() < f64::EPSILON)
    }
}

/// A passing result at the `STANDARD` level
pub fn standard() -> ValidationResult {
    ValidationResult::valid(ValidationConfidence::Standard.score())
}

/// A failing result for unparseable input
pub fn invalid_format(reason: impl Into<String>) -> ValidationResult {
    ValidationResult::invalid(ValidationConfidence::InvalidFormat.score(), reason)
}

/// A failing result for checksum or range violations
pub fn failed(reason: impl Into<String>) -> ValidationResult {
    ValidationResult::invalid(ValidationConfidence::Failed.score(), reason)
}

/// Format validator for one entity type
pub trait Validator: Send + Sync {
    /// The entity type this validator covers
    fn entity_type(&self) -> EntityType;

    /// Grade a candidate string
    fn validate(&self, text: &str) -> ValidationResult;
}

/// Trim the candidate and enforce a per-validator length bound
///
/// Over-long input is rejected before any regex runs.
pub(crate) fn bounded(text: &str, max_len: usize) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() > max_len {
        return None;
    }
    Some(trimmed)
}

/// Type-keyed validator registry, constructed once and injected
pub struct ValidatorRegistry {
    validators: HashMap<EntityType, Box<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Registry with no validators; entity types without one pass through
    /// validation untouched
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Registry with the standard seven validators
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(IbanValidator::new()));
        registry.register(Box::new(AvsValidator::new()));
        registry.register(Box::new(DateValidator::new()));
        registry.register(Box::new(PhoneValidator::new()));
        registry.register(Box::new(EmailValidator::new()));
        registry.register(Box::new(PostalCodeValidator::new()));
        registry.register(Box::new(VatValidator::new()));
        registry
    }

    /// Add or replace the validator for its entity type
    pub fn register(&mut self, validator: Box<dyn Validator>) {
        self.validators.insert(validator.entity_type(), validator);
    }

    /// Look up the validator for an entity type
    pub fn get(&self, entity_type: EntityType) -> Option<&dyn Validator> {
        self.validators.get(&entity_type).map(|v| v.as_ref())
    }

    /// Validate `text` as `entity_type`; `None` when no validator covers it
    pub fn validate(&self, entity_type: EntityType, text: &str) -> Option<ValidationResult> {
        self.get(entity_type).map(|v| v.validate(text))
    }

    /// Number of registered validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// True when no validator is registered
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("entity_types", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_the_seven_types() {
        let registry = ValidatorRegistry::with_defaults();
        assert_eq!(registry.len(), 7);
        for ty in [
            EntityType::Iban,
            EntityType::SwissAvs,
            EntityType::Date,
            EntityType::Phone,
            EntityType::Email,
            EntityType::PostalCode,
            EntityType::VatId,
        ] {
            assert!(registry.get(ty).is_some(), "missing validator for {ty}");
        }
        assert!(registry.get(EntityType::Name).is_none());
    }

    #[test]
    fn test_validate_returns_none_without_validator() {
        let registry = ValidatorRegistry::empty();
        assert!(registry.validate(EntityType::Email, "x@y.ch").is_none());
    }

    #[test]
    fn test_lattice_scores_round_trip() {
        for level in [
            ValidationConfidence::Standard,
            ValidationConfidence::InvalidFormat,
            ValidationConfidence::Failed,
        ] {
            assert_eq!(ValidationConfidence::from_score(level.score()), Some(level));
        }
        assert_eq!(ValidationConfidence::from_score(0.5), None);
    }

    #[test]
    fn test_bounded_rejects_oversized_input() {
        assert!(bounded(&"9".repeat(65), 64).is_none());
        assert_eq!(bounded("  abc  ", 64), Some("abc"));
        assert!(bounded("   ", 64).is_none());
    }
}
