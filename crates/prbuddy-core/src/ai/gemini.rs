// SPDX-License-Identifier: Apache-2.0

//! Google AI Studio (Gemini) API client.
//!
//! Calls `models/{model}:generateContent` with JSON output requested and hands
//! the raw body back to the caller for extraction.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use super::provider::Generator;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::AiConfig;
use crate::error::TransportError;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
///
/// Holds the HTTP client, API key, and model configuration for reuse across
/// requests.
pub struct GeminiClient {
    /// HTTP client with configured timeout.
    http: Client,
    /// API key for Gemini authentication.
    api_key: SecretString,
    /// API base URL, without trailing slash.
    api_base: String,
    /// Model name (e.g., "gemini-2.5-pro").
    model: String,
    /// Maximum tokens for API responses.
    max_output_tokens: u32,
    /// Temperature for API requests.
    temperature: f32,
}

impl GeminiClient {
    /// Creates a new Gemini client with a provided API key.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn with_api_key(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    /// Returns the `generateContent` URL for the configured model.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        let request =
            GenerateContentRequest::json(prompt, self.temperature, self.max_output_tokens);

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::network(format!("Failed to send request: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Gemini API returned an error status");
            let detail = error_detail(&body)
                .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body.trim()));
            return Err(TransportError::service(detail, Some(status.as_u16())));
        }

        if let Some(detail) = error_detail(&body) {
            warn!("Gemini API returned an error descriptor with a success status");
            return Err(TransportError::service(detail, Some(status.as_u16())));
        }

        debug!(body_len = body.len(), "Received Gemini response");
        Ok(body)
    }
}

/// Returns the summary of a top-level `error` object, if the body has one.
fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()?
        .error
        .map(|error| error.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    fn config(api_base: &str) -> AiConfig {
        AiConfig {
            api_base: api_base.to_string(),
            timeout_seconds: 5,
            ..AiConfig::default()
        }
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::with_api_key(
            SecretString::from("key"),
            &config("https://generativelanguage.googleapis.com/v1beta/"),
        )
        .unwrap();

        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn error_detail_reads_descriptor() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("API key not valid. Please pass a valid API key. (INVALID_ARGUMENT)")
        );
    }

    #[test]
    fn error_detail_ignores_success_and_garbage() {
        assert_eq!(error_detail(r#"{"candidates":[]}"#), None);
        assert_eq!(error_detail("upstream connect error"), None);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_failure() {
        // Nothing listens on port 1 locally
        let client =
            GeminiClient::with_api_key(SecretString::from("key"), &config("http://127.0.0.1:1"))
                .unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::NetworkFailure);
        assert_eq!(err.status, None);
    }
}
