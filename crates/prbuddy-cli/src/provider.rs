// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.
//!
//! Resolves the GitHub token from environment variables or the GitHub CLI,
//! and the Gemini API key from `GEMINI_API_KEY`.

use prbuddy_core::auth::{GEMINI_API_KEY_ENV, TokenProvider};
use secrecy::SecretString;
use tracing::debug;

/// CLI implementation of `TokenProvider`.
pub struct CliTokenProvider;

impl TokenProvider for CliTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if let Some((token, source)) = prbuddy_core::github::auth::resolve_token() {
            debug!(%source, "Resolved GitHub token");
            Some(token)
        } else {
            debug!("No GitHub token found in CLI sources");
            None
        }
    }

    fn gemini_key(&self) -> Option<SecretString> {
        match std::env::var(GEMINI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => {
                debug!("Resolved Gemini API key from environment variable");
                Some(SecretString::from(key))
            }
            _ => {
                debug!("No Gemini API key found in environment");
                None
            }
        }
    }
}
