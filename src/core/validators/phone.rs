//! Phone number validation (E.164-style digit count rules)

use super::{bounded, failed, invalid_format, standard, Validator};
use crate::domain::{EntityType, ValidationResult};

const MAX_LEN: usize = 32;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Validates phone candidates after stripping common separators. Accepts
/// `+` and `00` international prefixes and national forms with a leading
/// zero.
#[derive(Debug, Default)]
pub struct PhoneValidator;

impl PhoneValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for PhoneValidator {
    fn entity_type(&self) -> EntityType {
        EntityType::Phone
    }

    fn validate(&self, text: &str) -> ValidationResult {
        let Some(candidate) = bounded(text, MAX_LEN) else {
            return invalid_format("candidate empty or over length bound");
        };

        let mut digits = String::with_capacity(candidate.len());
        let mut international = false;
        for (i, c) in candidate.chars().enumerate() {
            match c {
                '+' if i == 0 => international = true,
                '0'..='9' => digits.push(c),
                ' ' | '.' | '-' | '/' | '(' | ')' => {}
                _ => return invalid_format("phone number contains unexpected characters"),
            }
        }

        // 00 dialling prefix is an international marker too; the prefix
        // itself does not count toward the significant digits.
        if !international && digits.starts_with("00") {
            international = true;
            digits.drain(..2);
        }

        if international && digits.starts_with('0') {
            return failed("country code cannot start with zero");
        }

        let count = digits.len();
        if count < MIN_DIGITS {
            return failed(format!("only {count} digits, expected at least {MIN_DIGITS}"));
        }
        if count > MAX_DIGITS {
            return failed(format!("{count} digits, expected at most {MAX_DIGITS}"));
        }
        standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validators::ValidationConfidence;
    use test_case::test_case;

    #[test_case("+41 44 668 18 00"; "swiss international")]
    #[test_case("0041446681800"; "double zero prefix")]
    #[test_case("044 668 18 00"; "swiss national")]
    #[test_case("+33 1 42 68 53 00"; "french international")]
    #[test_case("030/12345678"; "german slash style")]
    #[test_case("+49 (0) 30 1234567"; "trunk zero in parentheses")]
    fn test_valid_phones(text: &str) {
        let result = PhoneValidator::new().validate(text);
        assert!(result.is_valid, "{text:?}: {:?}", result.reason);
        assert_eq!(result.confidence, ValidationConfidence::Standard.score());
    }

    #[test]
    fn test_too_few_digits_fails() {
        let result = PhoneValidator::new().validate("123 456");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
    }

    #[test]
    fn test_too_many_digits_fails() {
        let result = PhoneValidator::new().validate("+41 1234 5678 9012 3456");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
    }

    #[test]
    fn test_letters_are_invalid_format() {
        let result = PhoneValidator::new().validate("+41 CALL ME");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }

    #[test]
    fn test_plus_inside_number_is_invalid_format() {
        let result = PhoneValidator::new().validate("044+6681800");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }

    #[test]
    fn test_zero_country_code_fails() {
        let result = PhoneValidator::new().validate("+041 44 668 18 00");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
    }
}
