//! CLI command implementations

pub mod init;
pub mod scan;
pub mod validate;

use crate::config::{load_config, load_config_or_default, ArgusConfig};
use crate::domain::Result;
use std::path::Path;

/// Configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "argus.toml";

/// Load configuration strictly from an explicit path, or leniently from the
/// default location (a missing default file falls back to embedded defaults)
pub fn load_configuration(config_path: Option<&Path>) -> Result<ArgusConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => load_config_or_default(DEFAULT_CONFIG_PATH),
    }
}
