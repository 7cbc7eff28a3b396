// SPDX-License-Identifier: Apache-2.0

//! Error types for prbuddy.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during prbuddy operations.
#[derive(Error, Debug)]
pub enum PrBuddyError {
    /// A precondition for the run is not met (missing tool, credential, repository).
    ///
    /// Checked before any interactive prompt or network call.
    #[error("Precondition failed: {message}")]
    Precondition {
        /// What is missing.
        message: String,
    },

    /// The generation backend could not be reached or rejected the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The generation backend replied, but the reply did not honor the contract.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A `git` invocation failed.
    #[error("git error: {message}")]
    Git {
        /// Error message, usually git's stderr.
        message: String,
    },

    /// GitHub API error from octocrab or the raw HTTP fallback.
    #[error("GitHub API error: {message}")]
    GitHub {
        /// Error message.
        message: String,
    },

    /// No GitHub token could be resolved.
    #[error(
        "Authentication required - run `gh auth login`, or set the GH_TOKEN or GITHUB_TOKEN environment variable"
    )]
    NotAuthenticated,

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

/// Classification of a failed generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request never produced a response (DNS, TLS, timeout, broken body).
    NetworkFailure,
    /// The service answered and rejected the request (bad key, quota, invalid argument).
    ServiceError,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::NetworkFailure => write!(f, "network failure"),
            TransportErrorKind::ServiceError => write!(f, "service error"),
        }
    }
}

/// Error returned by the generation client.
#[derive(Error, Debug, Clone)]
#[error("Generation request failed ({kind}): {detail}")]
pub struct TransportError {
    /// Failure class.
    pub kind: TransportErrorKind,
    /// Human-readable detail (service message or transport error text).
    pub detail: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
}

impl TransportError {
    /// Creates a network failure.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::NetworkFailure,
            detail: detail.into(),
            status: None,
        }
    }

    /// Creates a service error.
    #[must_use]
    pub fn service(detail: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind: TransportErrorKind::ServiceError,
            detail: detail.into(),
            status,
        }
    }
}

/// Why a generation reply could not be turned into a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// The reply is not a JSON envelope.
    EnvelopeMalformed,
    /// The envelope carries a top-level error descriptor.
    ServiceError {
        /// Numeric error code reported by the service, if any.
        code: Option<i64>,
        /// Error message reported by the service.
        message: String,
    },
    /// The envelope holds no generated text.
    ContentMissing {
        /// Finish or block reason reported by the service, if any.
        reason: Option<String>,
    },
    /// The generated text is not a JSON object.
    SchemaMalformed,
    /// A required field is absent or empty.
    FieldMissing {
        /// Field name.
        field: &'static str,
    },
    /// A required field is present but not a string.
    FieldType {
        /// Field name.
        field: &'static str,
    },
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionErrorKind::EnvelopeMalformed => write!(f, "response envelope is not valid JSON"),
            ExtractionErrorKind::ServiceError { code, message } => match code {
                Some(code) => write!(f, "service reported error {code}: {message}"),
                None => write!(f, "service reported error: {message}"),
            },
            ExtractionErrorKind::ContentMissing { reason } => match reason {
                Some(reason) => write!(f, "response holds no generated content (reason: {reason})"),
                None => write!(f, "response holds no generated content"),
            },
            ExtractionErrorKind::SchemaMalformed => {
                write!(f, "generated content is not a JSON object")
            }
            ExtractionErrorKind::FieldMissing { field } => {
                write!(f, "generated JSON is missing a non-empty `{field}` string")
            }
            ExtractionErrorKind::FieldType { field } => {
                write!(f, "generated JSON field `{field}` is not a string")
            }
        }
    }
}

/// Error returned by the response extractor.
///
/// Carries the payload that failed so it can be shown to a human.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid response from the generation backend: {kind}")]
pub struct ExtractionError {
    /// Failure class.
    pub kind: ExtractionErrorKind,
    /// The text that failed validation (envelope or inner content).
    pub raw_payload: String,
}

impl ExtractionError {
    /// Creates an extraction error.
    #[must_use]
    pub fn new(kind: ExtractionErrorKind, raw_payload: impl Into<String>) -> Self {
        Self {
            kind,
            raw_payload: raw_payload.into(),
        }
    }

    /// Returns true when the backend itself reported the failure.
    #[must_use]
    pub fn is_service_error(&self) -> bool {
        matches!(self.kind, ExtractionErrorKind::ServiceError { .. })
    }
}

impl From<octocrab::Error> for PrBuddyError {
    fn from(err: octocrab::Error) -> Self {
        PrBuddyError::GitHub {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for PrBuddyError {
    fn from(err: config::ConfigError) -> Self {
        PrBuddyError::Config {
            message: err.to_string(),
        }
    }
}
