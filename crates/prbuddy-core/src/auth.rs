// SPDX-License-Identifier: Apache-2.0

//! Token provider abstraction for credential resolution.
//!
//! The core never reads credentials from ambient state on its own; callers
//! hand it a `TokenProvider` so the sources (environment, `gh` CLI, test
//! fixtures) stay a front-end concern.

use secrecy::SecretString;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Provides GitHub and Gemini credentials for API calls.
///
/// Implementations should handle credential lookup and return `None` if
/// credentials are not available.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    ///
    /// Returns `None` if no token is available from any source.
    fn github_token(&self) -> Option<SecretString>;

    /// Retrieves the Gemini API key.
    ///
    /// Returns `None` if no API key is available from any source.
    fn gemini_key(&self) -> Option<SecretString>;
}
