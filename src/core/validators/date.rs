//! Date validation through real calendar parsing
//!
//! Candidates are parsed into year/month/day and handed to [`chrono`], so
//! impossible dates like `31.02.2024` fail even though they match the
//! detection regex. Month names resolve in English, French and German.

use super::{bounded, failed, invalid_format, standard, Validator};
use crate::domain::{EntityType, ValidationResult};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;

const MAX_LEN: usize = 48;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Validates date candidates in numeric (day-first and ISO) and month-name
/// forms.
#[derive(Debug)]
pub struct DateValidator {
    numeric: Regex,
    iso: Regex,
    day_name_year: Regex,
    name_day_year: Regex,
    months: HashMap<&'static str, u32>,
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DateValidator {
    pub fn new() -> Self {
        Self {
            numeric: Regex::new(r"^(\d{1,2})[./-](\d{1,2})[./-](\d{4})$").unwrap(),
            iso: Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap(),
            // "15. März 2024", "15 janvier 2024"
            day_name_year: Regex::new(r"^(\d{1,2})\.?\s+(\p{L}+)\.?\s+(\d{4})$").unwrap(),
            // "March 15, 2024"
            name_day_year: Regex::new(r"^(\p{L}+)\.?\s+(\d{1,2})\s*,?\s+(\d{4})$").unwrap(),
            months: month_table(),
        }
    }

    fn month_number(&self, name: &str) -> Option<u32> {
        self.months.get(name.to_lowercase().as_str()).copied()
    }

    fn grade(&self, year: i32, month: u32, day: u32) -> ValidationResult {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return failed(format!("year {year} outside {MIN_YEAR}-{MAX_YEAR}"));
        }
        if NaiveDate::from_ymd_opt(year, month, day).is_some() {
            standard()
        } else {
            failed(format!("{day:02}.{month:02}.{year} is not a calendar day"))
        }
    }
}

impl Validator for DateValidator {
    fn entity_type(&self) -> EntityType {
        EntityType::Date
    }

    fn validate(&self, text: &str) -> ValidationResult {
        let Some(candidate) = bounded(text, MAX_LEN) else {
            return invalid_format("candidate empty or over length bound");
        };

        if let Some(caps) = self.numeric.captures(candidate) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            return self.grade(year, month, day);
        }

        if let Some(caps) = self.iso.captures(candidate) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            return self.grade(year, month, day);
        }

        if let Some(caps) = self.day_name_year.captures(candidate) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            return match self.month_number(&caps[2]) {
                Some(month) => self.grade(year, month, day),
                None => invalid_format(format!("unknown month name '{}'", &caps[2])),
            };
        }

        if let Some(caps) = self.name_day_year.captures(candidate) {
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            return match self.month_number(&caps[1]) {
                Some(month) => self.grade(year, month, day),
                None => invalid_format(format!("unknown month name '{}'", &caps[1])),
            };
        }

        invalid_format("unrecognized date shape")
    }
}

fn month_table() -> HashMap<&'static str, u32> {
    let mut table = HashMap::new();
    let entries: [(&[&str], u32); 12] = [
        (&["january", "jan", "janvier", "janv", "januar", "jänner"], 1),
        (&["february", "feb", "février", "fevrier", "févr", "februar"], 2),
        (&["march", "mar", "mars", "märz", "maerz", "mrz"], 3),
        (&["april", "apr", "avril", "avr"], 4),
        (&["may", "mai"], 5),
        (&["june", "jun", "juin", "juni"], 6),
        (&["july", "jul", "juillet", "juil", "juli"], 7),
        (&["august", "aug", "août", "aout"], 8),
        (&["september", "sep", "sept", "septembre"], 9),
        (&["october", "oct", "octobre", "okt", "oktober"], 10),
        (&["november", "nov", "novembre"], 11),
        (&["december", "dec", "décembre", "decembre", "déc", "dez", "dezember"], 12),
    ];
    for (names, number) in entries {
        for name in names {
            table.insert(*name, number);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validators::ValidationConfidence;
    use test_case::test_case;

    #[test_case("15.03.2024"; "dotted day first")]
    #[test_case("15/03/2024"; "slashed day first")]
    #[test_case("15-03-2024"; "dashed day first")]
    #[test_case("2024-03-15"; "iso")]
    #[test_case("15. März 2024"; "german month name")]
    #[test_case("15 janvier 2024"; "french month name")]
    #[test_case("March 15, 2024"; "english month first")]
    #[test_case("15 March 2024"; "english day first")]
    #[test_case("1. Jänner 2000"; "austrian january")]
    fn test_valid_dates(text: &str) {
        let result = DateValidator::new().validate(text);
        assert!(result.is_valid, "{text:?}: {:?}", result.reason);
        assert_eq!(result.confidence, ValidationConfidence::Standard.score());
    }

    #[test_case("31.02.2024"; "february 31st")]
    #[test_case("00.01.2024"; "day zero")]
    #[test_case("15.13.2024"; "month 13")]
    #[test_case("29.02.2023"; "leap day off year")]
    fn test_impossible_dates_fail(text: &str) {
        let result = DateValidator::new().validate(text);
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
    }

    #[test]
    fn test_leap_day_on_leap_year_is_valid() {
        assert!(DateValidator::new().validate("29.02.2024").is_valid);
    }

    #[test_case("15.03.1899"; "before range")]
    #[test_case("15.03.2101"; "after range")]
    fn test_year_range(text: &str) {
        let result = DateValidator::new().validate(text);
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::Failed.score());
        assert!(result.reason.as_deref().unwrap().contains("outside"));
    }

    #[test]
    fn test_unknown_month_name() {
        let result = DateValidator::new().validate("15 Febtember 2024");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }

    #[test]
    fn test_unrecognized_shape() {
        let result = DateValidator::new().validate("next tuesday");
        assert!(!result.is_valid);
        assert_eq!(result.confidence, ValidationConfidence::InvalidFormat.score());
    }
}
