//! Neural NER adapters
//!
//! Detection can fold in a token-classification model behind an async
//! boundary. The model returns BIO-labeled tokens over byte offsets of the
//! submitted text; stitching tokens into entities happens in the core
//! merge pass, not here.

pub mod http;

pub use http::HttpNerModel;

use crate::domain::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One BIO-labeled token as returned by the model
///
/// `start`/`end` are byte offsets into the submitted text. `label` carries
/// the BIO scheme (`B-PER`, `I-PER`, `B-LOC`, `B-ORG`, `O`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerToken {
    pub text: String,
    pub label: String,
    pub score: f64,
    pub start: usize,
    pub end: usize,
}

impl NerToken {
    /// Split a BIO label into its prefix and type, e.g. `B-PER` → `(B, PER)`
    pub fn bio_parts(&self) -> Option<(&str, &str)> {
        self.label.split_once('-')
    }
}

/// Token-classification model boundary
#[async_trait]
pub trait NerModel: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Predict BIO tokens for `text`
    ///
    /// Offsets in the returned tokens refer to `text` as submitted. Errors
    /// are [`crate::domain::InferenceError`] wrapped in the domain error;
    /// callers degrade to regex-only detection on failure.
    async fn predict(&self, text: &str) -> Result<Vec<NerToken>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bio_parts() {
        let token = NerToken {
            text: "Keller".into(),
            label: "B-PER".into(),
            score: 0.98,
            start: 5,
            end: 11,
        };
        assert_eq!(token.bio_parts(), Some(("B", "PER")));

        let outside = NerToken {
            text: "the".into(),
            label: "O".into(),
            score: 0.99,
            start: 0,
            end: 3,
        };
        assert_eq!(outside.bio_parts(), None);
    }
}
