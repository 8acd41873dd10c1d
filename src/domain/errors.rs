//! Domain error types
//!
//! This module defines the error hierarchy for Argus. All errors are
//! domain-specific and don't expose third-party types. Detection failures
//! degrade rather than abort: an unparseable candidate or a failed checksum
//! lowers confidence, an inference failure drops the pipeline to regex-only
//! mode, and a bad configuration falls back to the embedded defaults. The
//! variants here exist so each layer can name what went wrong while the
//! document still produces a result.

use thiserror::Error;

/// Main Argus error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ArgusError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input that cannot be processed at all (e.g. not valid text)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A candidate string that does not parse as its claimed entity type
    #[error("Unparseable candidate: {0}")]
    UnparseableCandidate(String),

    /// A candidate that parses but fails its checksum or range rule
    #[error("Structurally invalid candidate: {0}")]
    StructurallyInvalid(String),

    /// NER inference errors
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Detection was cancelled at a pass boundary
    #[error("Detection cancelled before pass '{0}'")]
    Cancelled(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Audit trail errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// NER inference service errors
///
/// Errors that occur when talking to the inference sidecar. These errors
/// don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the inference service
    #[error("Failed to connect to inference service: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the service
    #[error("Invalid response from inference service: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Inference server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Inference client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Inference request timeout: {0}")]
    Timeout(String),

    /// Inference is not configured for this pipeline
    #[error("No inference backend configured")]
    NotConfigured,
}

// Conversion from std::io::Error
impl From<std::io::Error> for ArgusError {
    fn from(err: std::io::Error) -> Self {
        ArgusError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArgusError {
    fn from(err: serde_json::Error) -> Self {
        ArgusError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ArgusError {
    fn from(err: toml::de::Error) -> Self {
        ArgusError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for ArgusError {
    fn from(err: regex::Error) -> Self {
        ArgusError::Configuration(format!("Invalid pattern: {err}"))
    }
}
