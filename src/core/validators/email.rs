//! Email address validation (structural rules, no deliverability checks)

use super::{bounded, failed, invalid_format, standard, Validator};
use crate::domain::{EntityType, ValidationResult};

const MAX_LEN: usize = 320;

const MAX_TOTAL: usize = 254;
const MAX_LOCAL: usize = 64;
const MAX_LABEL: usize = 63;

/// Validates email candidates against the format rules that matter for
/// detection quality: a single `@`, sane dot placement, labeled domain
/// with an alphabetic TLD.
#[derive(Debug, Default)]
pub struct EmailValidator;

impl EmailValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for EmailValidator {
    fn entity_type(&self) -> EntityType {
        EntityType::Email
    }

    fn validate(&self, text: &str) -> ValidationResult {
        let Some(candidate) = bounded(text, MAX_LEN) else {
            return invalid_format("candidate empty or over length bound");
        };

        if candidate.chars().any(char::is_whitespace) {
            return invalid_format("email contains whitespace");
        }
        let mut parts = candidate.splitn(3, '@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return invalid_format("email must contain exactly one @");
        };
        if local.is_empty() || domain.is_empty() {
            return invalid_format("email must contain exactly one @");
        }

        if candidate.len() > MAX_TOTAL {
            return failed(format!("address exceeds {MAX_TOTAL} characters"));
        }
        if local.len() > MAX_LOCAL {
            return failed(format!("local part exceeds {MAX_LOCAL} characters"));
        }
        if local.starts_with('.') || local.ends_with('.') {
            return failed("local part starts or ends with a dot");
        }
        if local.contains("..") {
            return failed("local part contains consecutive dots");
        }
        if !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '%'))
        {
            return failed("local part contains unsupported characters");
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return failed("domain has no dot");
        }
        for label in &labels {
            if label.is_empty() {
                return failed("domain contains an empty label");
            }
            if label.len() > MAX_LABEL {
                return failed(format!("domain label exceeds {MAX_LABEL} characters"));
            }
            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return failed("domain label contains unsupported characters");
            }
            if label.starts_with('-') || label.ends_with('-') {
                return failed("domain label starts or ends with a hyphen");
            }
        }
        let tld = labels[labels.len() - 1];
        if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
            return failed("top-level domain must be at least two letters");
        }

        standard()
    }
}
