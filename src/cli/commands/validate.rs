//! Validate config command implementation
//!
//! Checks the configuration file plus every asset override it points at
//! (patterns, deny list, rules). Unlike the pipeline loaders, which fall
//! back to embedded defaults when an override is broken, this command
//! reports the problem and exits with code 2.

use crate::cli::commands::load_configuration;
use crate::core::denylist::DenyListConfig;
use crate::core::detect::PatternsConfig;
use crate::core::rules::RulesConfig;
use crate::domain::ArgusError;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown_path = config_path.map_or_else(
            || format!("{} (embedded defaults when absent)", super::DEFAULT_CONFIG_PATH),
            |path| path.display().to_string(),
        );
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("🔍 Validating configuration: {shown_path}");
        println!();

        let config = match load_configuration(config_path) {
            Ok(config) => {
                println!("✅ Configuration file loaded successfully");
                config
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let mut problems = 0;
        match check_patterns(config.patterns.path.as_deref()) {
            Ok(summary) => println!("✅ Patterns: {summary}"),
            Err(e) => {
                println!("❌ Patterns: {e}");
                problems += 1;
            }
        }
        match check_deny_list(config.deny_list.path.as_deref()) {
            Ok(summary) => println!("✅ Deny list: {summary}"),
            Err(e) => {
                println!("❌ Deny list: {e}");
                problems += 1;
            }
        }
        match check_rules(config.rules.path.as_deref()) {
            Ok(summary) => println!("✅ Rules: {summary}"),
            Err(e) => {
                println!("❌ Rules: {e}");
                problems += 1;
            }
        }

        if problems > 0 {
            println!();
            println!("❌ {problems} problem(s) found");
            return Ok(2);
        }

        println!();
        println!("Configuration Summary:");
        println!(
            "  Reporting floor:  {:.2}",
            config.detection.min_confidence
        );
        println!(
            "  Default language: {}",
            config
                .detection
                .default_language
                .map_or("auto-detect", |language| language.code())
        );
        match config.detection.parallelism {
            0 => println!("  Parallelism:      auto"),
            n => println!("  Parallelism:      {n}"),
        }
        if config.ner.enabled {
            println!(
                "  NER endpoint:     {} (timeout {} ms)",
                config.ner.endpoint.as_deref().unwrap_or("-"),
                config.ner.timeout_ms
            );
        } else {
            println!("  NER:              disabled (regex-only)");
        }
        if config.audit.enabled {
            println!("  Audit trail:      {}", config.audit.log_path.display());
        } else {
            println!("  Audit trail:      disabled");
        }
        println!();
        println!("✅ Configuration is valid");
        Ok(0)
    }
}

fn check_patterns(path: Option<&Path>) -> crate::domain::Result<String> {
    let Some(path) = path else {
        return Ok("embedded defaults".to_string());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = PatternsConfig::from_toml(&contents)?;
    let pattern_count: usize = config.patterns.values().map(Vec::len).sum();
    Ok(format!(
        "{} ({} entity types, {pattern_count} patterns, {} context words)",
        path.display(),
        config.patterns.len(),
        config.context_words.len()
    ))
}

fn check_deny_list(path: Option<&Path>) -> crate::domain::Result<String> {
    let Some(path) = path else {
        return Ok("embedded defaults".to_string());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = DenyListConfig::from_toml(&contents)?;
    config.validate().map_err(ArgusError::Configuration)?;
    let terms = config.global.terms.len()
        + config
            .by_entity_type
            .values()
            .chain(config.by_language.values())
            .map(|scope| scope.terms.len())
            .sum::<usize>();
    Ok(format!("{} ({terms} terms)", path.display()))
}

fn check_rules(path: Option<&Path>) -> crate::domain::Result<String> {
    let Some(path) = path else {
        return Ok("embedded defaults".to_string());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = RulesConfig::from_toml(&contents)?;
    Ok(format!(
        "{} (version {}, {} document types)",
        path.display(),
        config.version,
        config.document_types.len()
    ))
}
