//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables are serialized through a
//! mutex to avoid interference between tests.

use argus::config::{load_config, load_config_or_default};
use argus::domain::Language;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("ARGUS_TEST_NER_PASSWORD", "sidecar-secret");

    let file = write_temp_config(
        r#"
[detection]
min_confidence = 0.4
default_language = "de"
parallelism = 2

[ner]
enabled = true
endpoint = "http://localhost:8500/predict"
timeout_ms = 3000
username = "argus"
password = "${ARGUS_TEST_NER_PASSWORD}"

[patterns]
path = "patterns/custom_patterns.toml"

[audit]
enabled = true
log_path = "audit/argus-audit.jsonl"

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.detection.min_confidence, 0.4);
    assert_eq!(config.detection.default_language, Some(Language::De));
    assert_eq!(config.detection.parallelism, 2);
    assert!(config.ner.enabled);
    assert_eq!(config.ner.timeout_ms, 3000);
    assert_eq!(
        config.ner.password.as_ref().unwrap().expose_secret(),
        "sidecar-secret"
    );
    assert!(config.audit.enabled);
    assert_eq!(config.logging.level, "debug");

    std::env::remove_var("ARGUS_TEST_NER_PASSWORD");
}

#[test]
fn test_unset_substitution_variable_is_reported_by_name() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::remove_var("ARGUS_TEST_UNSET_SECRET");

    let file = write_temp_config(
        r#"
[ner]
enabled = true
endpoint = "http://localhost:8500/predict"
username = "argus"
password = "${ARGUS_TEST_UNSET_SECRET}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("ARGUS_TEST_UNSET_SECRET"));
}

#[test]
fn test_env_override_beats_file_value() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("ARGUS_LOGGING_LEVEL", "warn");
    std::env::set_var("ARGUS_DETECTION_MIN_CONFIDENCE", "0.6");

    let file = write_temp_config(
        r#"
[detection]
min_confidence = 0.3

[logging]
level = "info"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.detection.min_confidence, 0.6);

    std::env::remove_var("ARGUS_LOGGING_LEVEL");
    std::env::remove_var("ARGUS_DETECTION_MIN_CONFIDENCE");
}

#[test]
fn test_default_lookup_accepts_missing_file_but_not_broken_one() {
    let _guard = ENV_MUTEX.lock().unwrap();

    let config = load_config_or_default("does-not-exist.toml").unwrap();
    assert!(!config.ner.enabled);
    assert_eq!(config.detection.min_confidence, 0.0);

    // An existing file with invalid content must still fail loudly.
    let file = write_temp_config("[detection]\nmin_confidence = \"high\"\n");
    assert!(load_config_or_default(file.path()).is_err());
}

#[test]
fn test_ner_section_requires_consistent_credentials() {
    let _guard = ENV_MUTEX.lock().unwrap();

    let file = write_temp_config(
        r#"
[ner]
enabled = true
endpoint = "http://localhost:8500/predict"
username = "argus"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("together"));
}
