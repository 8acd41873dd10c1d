//! Swiss AVS/AHV number validation (756 prefix, EAN-13 check digit)

use super::{bounded, failed, invalid_format, standard, Validator};
use crate::domain::{EntityType, ValidationResult};

const MAX_LEN: usize = 32;

/// Validates the 13-digit social insurance number. Accepts the dotted
/// `756.1234.5678.97` form and the bare digit run.
#[derive(Debug, Default)]
pub struct AvsValidator;

impl AvsValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for AvsValidator {
    fn entity_type(&self) -> EntityType {
        EntityType::SwissAvs
    }

    fn validate(&self, text: &str) -> ValidationResult {
        let Some(candidate) = bounded(text, MAX_LEN) else {
            return invalid_format("candidate empty or over length bound");
        };

        let mut digits: Vec<u32> = Vec::with_capacity(13);
        for c in candidate.chars() {
            match c {
                '0'..='9' => digits.push(c.to_digit(10).unwrap_or(0)),
                '.' | ' ' => {}
                _ => return invalid_format("AVS number contains unexpected characters"),
            }
        }
        if digits.len() != 13 {
            return invalid_format(format!("AVS number has {} digits, expected 13", digits.len()));
        }

        if digits[..3] != [7, 5, 6] {
            return failed("AVS number does not carry the Swiss 756 prefix");
        }

        let expected = ean13_check_digit(&digits[..12]);
        if digits[12] == expected {
            standard()
        } else {
            failed(format!(
                "AVS check digit {} does not match computed {}",
                digits[12], expected
            ))
        }
    }
}

/// EAN-13 check digit: weights alternate 1 and 3 over the first twelve
/// digits, check = (10 - sum mod 10) mod 10.
fn ean13_check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { *d } else { *d * 3 })
        .sum();
    (10 - sum % 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validators::ValidationConfidence;

    const VALID_DOTTED: &str = "756.1234.5678.97";

    #[test]
    fn test_valid_dotted_form() {
        let result = AvsValidator::new().validate(VALID_DOTTED);
        assert!(result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Standard.score());
    }

    #[test]
    fn test_valid_bare_form() {
        assert!(AvsValidator::new().validate("7561234567897").is_valid);
    }

    #[test]
    fn test_check_digit_mismatch_fails() {
        let result = AvsValidator::new().validate("756.1234.5678.98");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
    }

    #[test]
    fn test_every_single_digit_flip_is_caught() {
        // EAN-13 weights are 1 and 3, both coprime to 10, so any single
        // digit change must shift the check digit.
        let validator = AvsValidator::new();
        let base = "7561234567897";
        for i in 0..13 {
            let c = base.as_bytes()[i] - b'0';
            let flipped = (c + 1) % 10;
            let mut mutated = base.to_string();
            mutated.replace_range(i..i + 1, &flipped.to_string());
            assert!(
                !validator.validate(&mutated).is_valid,
                "flip at {i} went undetected: {mutated}"
            );
        }
    }

    #[test]
    fn test_foreign_prefix_fails() {
        // Valid EAN-13 check digit over a non-Swiss prefix still fails.
        let result = AvsValidator::new().validate("755.1234.5678.98");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
        assert!(result.reason.as_deref().unwrap().contains("756"));
    }

    #[test]
    fn test_wrong_length_is_invalid_format() {
        let result = AvsValidator::new().validate("756.1234.5678");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }

    #[test]
    fn test_letters_are_invalid_format() {
        let result = AvsValidator::new().validate("756.1234.ABCD.97");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }
}
