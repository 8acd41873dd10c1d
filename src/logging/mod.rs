//! Logging and observability
//!
//! Structured logging built on `tracing`: console output on stderr in text
//! or JSON format, plus an optional rotating JSON file layer. All detection
//! passes log through the `tracing` macros; initialize once at startup and
//! keep the returned guard alive.
//!
//! # Example
//!
//! ```no_run
//! use argus::logging::init_logging;
//! use argus::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("scanner ready");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
