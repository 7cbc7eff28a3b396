// SPDX-License-Identifier: Apache-2.0

//! Request/response types for the Gemini `generateContent` API.
//!
//! Defines the structures used for communicating with the API and the
//! structured pull request draft the model is asked to produce.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn here.
    pub contents: Vec<Content>,
    /// Sampling and output-format settings.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Builds a single-turn request that asks for a JSON reply.
    #[must_use]
    pub fn json(prompt: &str, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: Some(temperature),
                max_output_tokens: Some(max_output_tokens),
            },
        }
    }
}

/// A message made of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Message parts; only text parts are used.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Text payload (absent for non-text parts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output MIME type ("application/json" for structured output).
    pub response_mime_type: String,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens in the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Response envelope from `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate replies (usually just one).
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback about the prompt, set when it was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Error descriptor, set instead of candidates on failure.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// A single candidate reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated message.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped (e.g. `STOP`, `MAX_TOKENS`, `SAFETY`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Returns the text of the first part that carries text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }
}

/// Prompt feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason, when the prompt was rejected.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Google API error descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP-like numeric code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status (e.g. `INVALID_ARGUMENT`).
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorBody {
    /// Formats the descriptor as `message (STATUS)`.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.status {
            Some(status) if self.message.is_empty() => status.clone(),
            Some(status) => format!("{} ({status})", self.message),
            None => self.message.clone(),
        }
    }
}

/// Title and description produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPr {
    /// Pull request title.
    pub title: String,
    /// Pull request description (markdown).
    pub description: String,
}
