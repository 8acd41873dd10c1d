//! Core detection logic for Argus.
//!
//! This module contains the detection passes and their orchestration.
//!
//! # Modules
//!
//! - [`normalize`] - Offset-preserving text normalization
//! - [`detect`] - Regex candidate generation over the pattern registry
//! - [`merge`] - BIO token stitching and rule/ML stream fusion
//! - [`lemma`] - Suffix-stripping lemmatizer for EN/FR/DE
//! - [`context`] - Lemma-aware context-window confidence scoring
//! - [`denylist`] - False-positive veto list with atomic snapshot swap
//! - [`validators`] - Per-type format and checksum validators
//! - [`classify`] - Document type classification and language vote
//! - [`rules`] - Per-document-type boosts and confidence thresholds
//! - [`pipeline`] - The sequential multi-pass detection pipeline
//!
//! # Detection Workflow
//!
//! The passes run strictly in order for each document:
//!
//! 1. **Normalize**: NFKC, de-obfuscation, index map to original offsets
//! 2. **Detect**: regex candidates, plus neural NER fused in when available
//! 3. **Context**: nearby label words adjust confidence
//! 4. **Deny**: known false positives are removed
//! 5. **Validate**: checksums and structural rules grade each candidate
//! 6. **Classify + rules**: document type selects boosts and thresholds
//! 7. **Boundary**: spans translate back to original coordinates
//!
//! # Example
//!
//! ```rust,no_run
//! use argus::config::ArgusConfig;
//! use argus::core::pipeline::DetectionPipeline;
//! use argus::domain::DocumentInput;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArgusConfig::default();
//! let pipeline = DetectionPipeline::from_config(&config)?;
//!
//! let document = DocumentInput::new("Kontakt: max.muster@example.com");
//! let result = pipeline.detect(&document).await?;
//!
//! for entity in &result.entities {
//!     println!("{} [{}..{}] {:.2}", entity.entity_type, entity.start, entity.end, entity.confidence);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod context;
pub mod denylist;
pub mod detect;
pub mod lemma;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod validators;
