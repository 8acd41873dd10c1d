//! External system integrations for Argus.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`ner`] - Neural NER inference service over HTTP
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with mock implementations. The NER layer is trait-based
//! so the pipeline never depends on a concrete inference backend.
//!
//! ```rust,no_run
//! use argus::adapters::ner::HttpNerModel;
//! use argus::config::NerConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NerConfig {
//!     enabled: true,
//!     endpoint: Some("http://localhost:8500/predict".to_string()),
//!     timeout_ms: 5000,
//!     username: None,
//!     password: None,
//! };
//!
//! let model = HttpNerModel::from_config(&config)?;
//! // Hand the model to DetectionPipeline::with_ner
//! # Ok(())
//! # }
//! ```

pub mod ner;
