//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ArgusConfig;
use crate::config::secret_string;
use crate::domain::errors::ArgusError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into ArgusConfig
/// 4. Applies environment variable overrides (`ARGUS_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<ArgusConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ArgusError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ArgusError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ArgusConfig = toml::from_str(&contents)
        .map_err(|e| ArgusError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ArgusError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads configuration, falling back to defaults when the file is absent
///
/// Used for the implicit `argus.toml` lookup: a missing file is normal and
/// yields the embedded defaults (still subject to `ARGUS_*` overrides). A
/// file that exists but fails to parse or validate remains an error.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<ArgusConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "no configuration file found, using defaults"
    );
    let mut config = ArgusConfig::default();
    apply_env_overrides(&mut config);
    config.validate().map_err(|e| {
        ArgusError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. A referenced but unset variable is an
/// error, reported once per variable.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ArgusError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the ARGUS_* prefix
///
/// Variables follow the pattern `ARGUS_<SECTION>_<KEY>`, for example
/// `ARGUS_NER_ENDPOINT` or `ARGUS_LOGGING_LEVEL`.
fn apply_env_overrides(config: &mut ArgusConfig) {
    use crate::domain::Language;

    // Detection overrides
    if let Ok(val) = std::env::var("ARGUS_DETECTION_MIN_CONFIDENCE") {
        if let Ok(threshold) = val.parse() {
            config.detection.min_confidence = threshold;
        }
    }
    if let Ok(val) = std::env::var("ARGUS_DETECTION_DEFAULT_LANGUAGE") {
        config.detection.default_language = Language::from_code(&val);
    }
    if let Ok(val) = std::env::var("ARGUS_DETECTION_PARALLELISM") {
        if let Ok(parallelism) = val.parse() {
            config.detection.parallelism = parallelism;
        }
    }

    // NER overrides
    if let Ok(val) = std::env::var("ARGUS_NER_ENABLED") {
        config.ner.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ARGUS_NER_ENDPOINT") {
        config.ner.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("ARGUS_NER_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.ner.timeout_ms = timeout;
        }
    }
    if let Ok(val) = std::env::var("ARGUS_NER_USERNAME") {
        config.ner.username = Some(val);
    }
    if let Ok(val) = std::env::var("ARGUS_NER_PASSWORD") {
        config.ner.password = Some(secret_string(val));
    }

    // Asset path overrides
    if let Ok(val) = std::env::var("ARGUS_PATTERNS_PATH") {
        config.patterns.path = Some(val.into());
    }
    if let Ok(val) = std::env::var("ARGUS_DENY_LIST_PATH") {
        config.deny_list.path = Some(val.into());
    }
    if let Ok(val) = std::env::var("ARGUS_RULES_PATH") {
        config.rules.path = Some(val.into());
    }

    // Audit overrides
    if let Ok(val) = std::env::var("ARGUS_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ARGUS_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ARGUS_LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("ARGUS_LOGGING_FORMAT") {
        config.logging.format = val;
    }
    if let Ok(val) = std::env::var("ARGUS_LOGGING_DIRECTORY") {
        config.logging.directory = Some(val.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ARGUS_TEST_SUBST_VAR", "test_value");
        let input = "password = \"${ARGUS_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("ARGUS_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ARGUS_TEST_MISSING_VAR");
        let input = "password = \"${ARGUS_TEST_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comment_lines() {
        let input = "# token = \"${ARGUS_TEST_COMMENT_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${ARGUS_TEST_COMMENT_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file_is_an_error() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_or_default_tolerates_missing_file() {
        let config = load_config_or_default("nonexistent.toml").unwrap();
        assert!(!config.ner.enabled);
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[detection]
min_confidence = 0.3

[ner]
enabled = true
endpoint = "http://localhost:8500/predict"

[logging]
level = "debug"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.detection.min_confidence, 0.3);
        assert!(config.ner.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let toml_content = r#"
[detection]
min_confidence = 1.5
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("min_confidence"));
    }
}
