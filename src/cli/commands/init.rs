//! Init command implementation
//!
//! Writes a starter `argus.toml` plus editable copies of the embedded
//! pattern assets, so a deployment can version and tune them.

use anyhow::Context;
use clap::Args;
use std::fs;
use std::path::Path;

const PATTERNS_ASSET: &str = include_str!("../../../patterns/pii_patterns.toml");
const DENY_LIST_ASSET: &str = include_str!("../../../patterns/deny_list.toml");
const RULES_ASSET: &str = include_str!("../../../patterns/document_rules.toml");

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "argus.toml")]
    pub output: String,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration");

        println!("📝 Initializing Argus configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        fs::write(&self.output, Self::starter_config())
            .with_context(|| format!("writing {}", self.output))?;
        println!("✅ Configuration file created: {}", self.output);

        let assets_dir = Path::new(&self.output)
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("patterns");
        fs::create_dir_all(&assets_dir)
            .with_context(|| format!("creating {}", assets_dir.display()))?;
        for (name, contents) in [
            ("pii_patterns.toml", PATTERNS_ASSET),
            ("deny_list.toml", DENY_LIST_ASSET),
            ("document_rules.toml", RULES_ASSET),
        ] {
            let path = assets_dir.join(name);
            if path.exists() && !self.force {
                println!("   kept existing {}", path.display());
                continue;
            }
            fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
            println!("   wrote {}", path.display());
        }

        println!();
        println!("Next steps:");
        println!("  1. Review {} and the assets under {}", self.output, assets_dir.display());
        println!("  2. Optional: enable [ner] and point it at your inference endpoint");
        println!("     (credentials go into .env as ARGUS_NER_USERNAME / ARGUS_NER_PASSWORD)");
        println!("  3. Check the setup: argus validate-config --config {}", self.output);
        println!("  4. Scan a document: argus scan letter.txt");
        Ok(0)
    }

    /// The starter `argus.toml`, matching the embedded defaults except that
    /// it points at the asset copies written next to it.
    fn starter_config() -> String {
        r#"# Argus configuration
# PII detection and confidence scoring for EN/FR/DE business documents.

[detection]
# Scan output omits entities below this confidence (0.0 reports everything).
min_confidence = 0.35
# Language assumed when a document carries no hint: "en", "fr" or "de".
# Leave unset to auto-detect per document.
# default_language = "de"
# Documents scanned concurrently (0 = number of CPU cores).
parallelism = 0

# Neural NER sidecar. While disabled, detection runs regex-only.
[ner]
enabled = false
# endpoint = "http://localhost:8500/predict"
# timeout_ms = 5000
# username = "${ARGUS_NER_USERNAME}"
# password = "${ARGUS_NER_PASSWORD}"

# Asset overrides. Remove a section to fall back to the embedded copy.
[patterns]
path = "patterns/pii_patterns.toml"

[deny_list]
path = "patterns/deny_list.toml"

[rules]
path = "patterns/document_rules.toml"

# JSON-lines audit trail; entity values are stored as SHA-256 hashes.
[audit]
enabled = false
log_path = "argus-audit.jsonl"

[logging]
level = "info"
format = "text"
# Rolling JSON log files land here when set.
# directory = "logs"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArgusConfig;

    #[test]
    fn test_starter_config_parses_and_validates() {
        let config: ArgusConfig = toml::from_str(&InitArgs::starter_config()).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.ner.enabled);
        assert_eq!(config.detection.min_confidence, 0.35);
        assert_eq!(
            config.patterns.path.as_deref(),
            Some(Path::new("patterns/pii_patterns.toml"))
        );
    }

    #[tokio::test]
    async fn test_init_writes_config_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("argus.toml");
        let args = InitArgs {
            output: output.display().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);
        assert!(output.exists());
        for asset in ["pii_patterns.toml", "deny_list.toml", "document_rules.toml"] {
            assert!(dir.path().join("patterns").join(asset).exists());
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("argus.toml");
        std::fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.display().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "# existing");

        let forced = InitArgs {
            output: output.display().to_string(),
            force: true,
        };
        assert_eq!(forced.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains("[detection]"));
    }
}
