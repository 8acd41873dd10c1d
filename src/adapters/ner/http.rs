//! HTTP client for a sidecar token-classification service

use super::{NerModel, NerToken};
use crate::config::NerConfig;
use crate::domain::{ArgusError, InferenceError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    tokens: Vec<NerToken>,
}

/// Client for an inference sidecar speaking a small JSON protocol:
/// `POST <endpoint>` with `{"text": ...}`, response `{"tokens": [...]}`.
#[derive(Debug)]
pub struct HttpNerModel {
    endpoint: String,
    client: Client,
    config: NerConfig,
}

impl HttpNerModel {
    /// Build the client from configuration
    pub fn from_config(config: &NerConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| ArgusError::Inference(InferenceError::NotConfigured))?;
        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.timeout_ms.min(10_000)))
            .build()
            .map_err(|e| ArgusError::Inference(InferenceError::ConnectionFailed(e.to_string())))?;
        Ok(Self {
            endpoint,
            client,
            config: config.clone(),
        })
    }

    fn auth_header_value(&self) -> Option<String> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return None;
        };
        let credentials = format!("{username}:{}", password.expose_secret().as_ref());
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        Some(format!("Basic {encoded}"))
    }
}

#[async_trait]
impl NerModel for HttpNerModel {
    fn name(&self) -> &str {
        "http-sidecar"
    }

    async fn predict(&self, text: &str) -> Result<Vec<NerToken>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { text });
        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ArgusError::Inference(InferenceError::Timeout(format!(
                    "{}ms elapsed",
                    self.config.timeout_ms
                )))
            } else {
                ArgusError::Inference(InferenceError::ConnectionFailed(e.to_string()))
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ArgusError::Inference(InferenceError::AuthenticationFailed(
                format!("inference service rejected credentials with {status}"),
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let error = if status.is_server_error() {
                InferenceError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                InferenceError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(ArgusError::Inference(error));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| ArgusError::Inference(InferenceError::InvalidResponse(e.to_string())))?;

        tracing::debug!(
            token_count = parsed.tokens.len(),
            text_len = text.len(),
            "inference service returned tokens"
        );
        Ok(parsed.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(endpoint: String) -> NerConfig {
        NerConfig {
            enabled: true,
            endpoint: Some(endpoint),
            timeout_ms: 2_000,
            username: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn test_predict_parses_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tokens": [
                    {"text": "Anna", "label": "B-PER", "score": 0.99, "start": 0, "end": 4},
                    {"text": "Keller", "label": "I-PER", "score": 0.97, "start": 5, "end": 11}
                ]}"#,
            )
            .create_async()
            .await;

        let model = HttpNerModel::from_config(&config(format!("{}/predict", server.url()))).unwrap();
        let tokens = model.predict("Anna Keller").await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].label, "B-PER");
        assert_eq!(tokens[1].start, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_maps_to_inference_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let model = HttpNerModel::from_config(&config(format!("{}/predict", server.url()))).unwrap();
        let err = model.predict("text").await.unwrap_err();
        match err {
            ArgusError::Inference(InferenceError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "model crashed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(401)
            .create_async()
            .await;

        let model = HttpNerModel::from_config(&config(format!("{}/predict", server.url()))).unwrap();
        let err = model.predict("text").await.unwrap_err();
        assert!(matches!(
            err,
            ArgusError::Inference(InferenceError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let model = HttpNerModel::from_config(&config(format!("{}/predict", server.url()))).unwrap();
        let err = model.predict("text").await.unwrap_err();
        assert!(matches!(
            err,
            ArgusError::Inference(InferenceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_basic_auth_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .with_status(200)
            .with_body(r#"{"tokens": []}"#)
            .create_async()
            .await;

        let mut cfg = config(format!("{}/predict", server.url()));
        cfg.username = Some("user".to_string());
        cfg.password = Some(secret_string("pass".to_string()));
        let model = HttpNerModel::from_config(&cfg).unwrap();
        model.predict("text").await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_missing_endpoint_is_not_configured() {
        let cfg = NerConfig {
            enabled: true,
            endpoint: None,
            timeout_ms: 2_000,
            username: None,
            password: None,
        };
        let err = HttpNerModel::from_config(&cfg).unwrap_err();
        assert!(matches!(
            err,
            ArgusError::Inference(InferenceError::NotConfigured)
        ));
    }
}
