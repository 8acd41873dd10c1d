//! Postal code validation for the Swiss, German and French systems

use super::{bounded, failed, invalid_format, standard, Validator};
use crate::domain::{EntityType, ValidationResult};

const MAX_LEN: usize = 16;

/// Validates postal codes. An explicit country prefix (`CH-8001`, `D-80331`,
/// `F-75008`) selects that country's rules; bare candidates are routed by
/// digit count, with the five-digit check relaxed to the union of the German
/// and French ranges since the two cannot be told apart without context.
#[derive(Debug, Default)]
pub struct PostalCodeValidator;

impl PostalCodeValidator {
    pub fn new() -> Self {
        Self
    }

    fn swiss(&self, digits: &str) -> ValidationResult {
        if digits.len() != 4 {
            return invalid_format("Swiss postal codes carry four digits");
        }
        let value: u32 = digits.parse().unwrap_or(0);
        if (1000..=9699).contains(&value) {
            standard()
        } else {
            failed(format!("{value:04} outside the Swiss range 1000-9699"))
        }
    }

    fn german(&self, digits: &str) -> ValidationResult {
        if digits.len() != 5 {
            return invalid_format("German postal codes carry five digits");
        }
        if digits == "00000" {
            failed("00000 is not an assigned German postal code")
        } else {
            standard()
        }
    }

    fn french(&self, digits: &str) -> ValidationResult {
        if digits.len() != 5 {
            return invalid_format("French postal codes carry five digits");
        }
        let department = &digits[..2];
        if department == "00" || department == "99" {
            failed(format!("department {department} is not assigned in France"))
        } else {
            standard()
        }
    }

    fn either_five_digit(&self, digits: &str) -> ValidationResult {
        // Without a country marker a 5-digit code may be German or French;
        // only the 00 prefix is invalid in both systems.
        if &digits[..2] == "00" {
            failed("no five-digit postal code starts with 00")
        } else {
            standard()
        }
    }
}

impl Validator for PostalCodeValidator {
    fn entity_type(&self) -> EntityType {
        EntityType::PostalCode
    }

    fn validate(&self, text: &str) -> ValidationResult {
        let Some(candidate) = bounded(text, MAX_LEN) else {
            return invalid_format("candidate empty or over length bound");
        };

        let upper = candidate.to_ascii_uppercase();
        let (country, rest) = if let Some(rest) = upper.strip_prefix("CH-") {
            (Some("CH"), rest)
        } else if let Some(rest) = upper.strip_prefix("DE-").or_else(|| upper.strip_prefix("D-")) {
            (Some("DE"), rest)
        } else if let Some(rest) = upper.strip_prefix("FR-").or_else(|| upper.strip_prefix("F-")) {
            (Some("FR"), rest)
        } else {
            (None, upper.as_str())
        };

        let digits = rest.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return invalid_format("postal code must be all digits");
        }

        match country {
            Some("CH") => self.swiss(digits),
            Some("DE") => self.german(digits),
            Some("FR") => self.french(digits),
            _ => match digits.len() {
                4 => self.swiss(digits),
                5 => self.either_five_digit(digits),
                n => invalid_format(format!("{n} digits is not a known postal format")),
            },
        }
    }
}
