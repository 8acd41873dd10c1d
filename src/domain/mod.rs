//! Domain models and types for Argus.
//!
//! This module contains the core domain models, types, and business rules for
//! Argus. All types are serde-serializable so results can cross the CLI
//! boundary as JSON.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Entity model** ([`Entity`], [`EntityType`], [`DetectionSource`])
//! - **Document model** ([`DocumentInput`], [`Language`], [`DocumentType`])
//! - **Result model** ([`DetectionResult`], [`PassStats`], [`ValidationResult`])
//! - **Error types** ([`ArgusError`], [`InferenceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Confidence discipline
//!
//! Every confidence score in the system stays within `[0.0, 1.0]`. Mutations
//! go through [`Entity::set_confidence`], which clamps, so no pass can push a
//! score out of range:
//!
//! ```rust
//! use argus::domain::{DetectionSource, Entity, EntityType};
//!
//! let mut entity = Entity::new("test@example.com", EntityType::Email, 8, 24, 0.9, DetectionSource::Rule);
//! entity.set_confidence(entity.confidence * 1.3);
//! assert!(entity.confidence <= 1.0);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ArgusError>`]:
//!
//! ```rust
//! use argus::domain::{ArgusError, Result};
//!
//! fn example(raw: &str) -> Result<()> {
//!     if raw.is_empty() {
//!         return Err(ArgusError::MalformedInput("empty document".into()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod detection;
pub mod document;
pub mod entity;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use detection::{
    DetectionMetadata, DetectionMode, DetectionResult, PassStats, ValidationResult,
};
pub use document::{
    ClassificationFeature, DocumentClassification, DocumentInput, DocumentType, Language,
};
pub use entity::{clamp_confidence, DetectionSource, Entity, EntityType};
pub use errors::{ArgusError, InferenceError};
pub use result::Result;
