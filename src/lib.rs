// Argus - PII detection and confidence scoring for business documents
// Copyright (c) 2025 Argus Contributors
// Licensed under the MIT License

//! # Argus - PII Detection for Business Documents
//!
//! Argus scans English, French and German business documents (invoices,
//! contracts, letters, forms) for personal data and scores every finding
//! with a calibrated confidence, so downstream anonymization can decide
//! what to redact automatically and what to hand to a reviewer.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** PII candidates with curated regex patterns and an
//!   optional neural NER sidecar
//! - **Scoring** candidates through context words, deny lists, format
//!   validators (IBAN, AVS, UID) and document-type rules
//! - **Classifying** documents by type and language to pick the right rules
//! - **Reporting** spans in original-document coordinates with a JSON-lines
//!   audit trail that stores entity values only as SHA-256 hashes
//!
//! ## Architecture
//!
//! Argus follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Detection passes (normalize, detect, context, validate,
//!   classify, rules) and the pipeline that sequences them
//! - [`adapters`] - External integrations (neural NER over HTTP)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`audit`] - Privacy-preserving audit trail
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use argus::core::pipeline::DetectionPipeline;
//! use argus::domain::DocumentInput;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration (embedded defaults when the file is absent)
//!     let config = argus::config::load_config_or_default("argus.toml")?;
//!
//!     // Build the pipeline once, scan many documents with it
//!     let pipeline = DetectionPipeline::from_config(&config)?;
//!
//!     let document = DocumentInput::new("IBAN: CH93 0076 2011 6238 5295 7".to_string());
//!     let result = pipeline.detect(&document).await?;
//!
//!     for entity in &result.entities {
//!         println!(
//!             "{} [{}..{}) confidence {:.2}",
//!             entity.entity_type, entity.start, entity.end, entity.confidence
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Argus uses the [`domain::ArgusError`] type for all errors:
//!
//! ```rust,no_run
//! use argus::domain::ArgusError;
//!
//! fn example() -> Result<(), ArgusError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = argus::config::load_config("argus.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Argus uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! # let err = "connection refused";
//! info!("Starting scan");
//! warn!(document_id = "invoice-17", "NER backend failed, degrading to regex-only");
//! error!(error = ?err, "Scan failed");
//! ```

pub mod adapters;
pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
