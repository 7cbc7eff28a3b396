// SPDX-License-Identifier: Apache-2.0

//! Generation backend trait.
//!
//! The pipeline only needs "prompt in, raw reply out". Validation of the reply
//! lives in [`super::extract`], so a backend never interprets what it returns.

use async_trait::async_trait;

use crate::error::TransportError;

/// A text-generation backend.
///
/// Implementations send exactly one request per call and never retry.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the name of the backend (e.g., "gemini").
    fn name(&self) -> &str;

    /// Returns the model identifier.
    fn model(&self) -> &str;

    /// Sends `prompt` and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received or the
    /// service rejected the request.
    async fn generate(&self, prompt: &str) -> Result<String, TransportError>;
}
