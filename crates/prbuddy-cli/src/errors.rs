// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `PrBuddyError` and appends a hint for each
//! error class. Structured error data stays in the library; presentation
//! lives here.

use std::fmt::Write;

use anyhow::Error;
use prbuddy_core::auth::GEMINI_API_KEY_ENV;
use prbuddy_core::error::{ExtractionError, PrBuddyError, TransportErrorKind};

/// Raw payloads longer than this are cut when echoed.
const MAX_PAYLOAD_ECHO: usize = 2000;

/// Formats an error for CLI display with helpful hints.
///
/// The full context chain is kept. When the chain holds a `PrBuddyError`, a
/// hint for that error class is appended.
pub fn format_error(error: &Error) -> String {
    let message = format!("{error:#}");

    let Some(err) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PrBuddyError>())
    else {
        return message;
    };

    match err {
        PrBuddyError::Precondition { .. } => {
            format!(
                "{message}\n\nTip: prbuddy needs git, a git repository, and the {GEMINI_API_KEY_ENV} environment variable."
            )
        }
        PrBuddyError::Transport(transport) => match transport.kind {
            TransportErrorKind::NetworkFailure => {
                format!("{message}\n\nTip: Check your internet connection and try again.")
            }
            TransportErrorKind::ServiceError => {
                let mut msg = message;
                if let Some(status) = transport.status {
                    let _ = write!(msg, " (HTTP {status})");
                }
                let _ = write!(
                    msg,
                    "\n\nTip: Check your {GEMINI_API_KEY_ENV} environment variable and the configured model."
                );
                msg
            }
        },
        PrBuddyError::Extraction(extraction) => format_extraction_error(message, extraction),
        PrBuddyError::NotAuthenticated => {
            format!("{message}\n\nTip: Run `gh auth login`, then `prbuddy auth status`.")
        }
        PrBuddyError::Config { .. } => {
            format!(
                "{message}\n\nTip: Check your config file at {}",
                prbuddy_core::config_file_path().display()
            )
        }
        PrBuddyError::GitHub { .. } => {
            format!("{message}\n\nTip: Check your GitHub token with `prbuddy auth status`.")
        }
        PrBuddyError::Git { .. } => {
            format!(
                "{message}\n\nTip: Make sure both branches exist and the remote is reachable with `git fetch`."
            )
        }
    }
}

/// Appends the payload that failed validation.
fn format_extraction_error(message: String, err: &ExtractionError) -> String {
    let mut msg = message;
    let payload = err.raw_payload.trim();
    if !payload.is_empty() {
        let shown: String = payload.chars().take(MAX_PAYLOAD_ECHO).collect();
        let _ = write!(msg, "\n\nResponse received:\n{shown}");
        if shown.len() < payload.len() {
            msg.push_str("\n[truncated]");
        }
    }
    if err.is_service_error() {
        msg.push_str("\n\nTip: The Gemini API rejected the request. Check your quota and API key.");
    } else {
        msg.push_str(
            "\n\nTip: The model did not return the expected JSON. Try again, or switch templates with --template.",
        );
    }
    msg
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use prbuddy_core::error::{ExtractionErrorKind, TransportError};

    use super::*;

    #[test]
    fn test_precondition_hint_names_api_key() {
        let err = Error::from(PrBuddyError::Precondition {
            message: "the GEMINI_API_KEY environment variable is not set".to_string(),
        });
        let formatted = format_error(&err);
        assert!(formatted.starts_with("Precondition failed"));
        assert!(formatted.contains("Tip:"));
        assert!(formatted.contains(GEMINI_API_KEY_ENV));
    }

    #[test]
    fn test_service_error_includes_status() {
        let err = Error::from(PrBuddyError::from(TransportError::service(
            "API key not valid",
            Some(400),
        )));
        let formatted = format_error(&err);
        assert!(formatted.contains("API key not valid"));
        assert!(formatted.contains("(HTTP 400)"));
    }

    #[test]
    fn test_network_failure_hint() {
        let err = Error::from(PrBuddyError::from(TransportError::network("dns error")));
        assert!(format_error(&err).contains("internet connection"));
    }

    #[test]
    fn test_schema_failure_echoes_payload() {
        let err = Error::from(PrBuddyError::from(ExtractionError::new(
            ExtractionErrorKind::SchemaMalformed,
            "Sure! Here is your PR description.",
        )));
        let formatted = format_error(&err);
        assert!(formatted.contains("Response received:"));
        assert!(formatted.contains("Sure! Here is your PR description."));
        assert!(formatted.contains("--template"));
    }

    #[test]
    fn test_long_payload_is_truncated() {
        let payload = "x".repeat(MAX_PAYLOAD_ECHO + 10);
        let err = Error::from(PrBuddyError::from(ExtractionError::new(
            ExtractionErrorKind::EnvelopeMalformed,
            payload,
        )));
        assert!(format_error(&err).contains("[truncated]"));
    }

    #[test]
    fn test_hint_found_through_context() {
        let err = Err::<(), _>(PrBuddyError::GitHub {
            message: "Not Found".to_string(),
        })
        .context("Pull request #4 was created at https://github.com/o/r/pull/4")
        .unwrap_err();
        let formatted = format_error(&err);
        assert!(formatted.starts_with("Pull request #4 was created"));
        assert!(formatted.contains("Not Found"));
        assert!(formatted.contains("prbuddy auth status"));
    }

    #[test]
    fn test_plain_error_passthrough() {
        let err = anyhow::anyhow!("Something went wrong");
        assert_eq!(format_error(&err), "Something went wrong");
    }
}
