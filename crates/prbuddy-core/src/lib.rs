// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # prbuddy Core
//!
//! Core library for the prbuddy CLI - AI-drafted pull requests and GitHub
//! workflow helpers.
//!
//! This crate provides reusable components for:
//! - Reading branch diffs from git
//! - Listing, creating and labelling GitHub issues
//! - Drafting pull request titles and descriptions with Gemini
//! - Publishing and merging pull requests
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prbuddy_core::ai::{GeminiClient, Generator, PromptTemplate, extract, prompt};
//! use prbuddy_core::load_config;
//! use secrecy::SecretString;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config()?;
//! let client = GeminiClient::with_api_key(SecretString::from("key"), &config.ai)?;
//!
//! let text = prompt::build(&PromptTemplate::Default, &[], "+fn main() {}\n");
//! let raw = client.generate(&text).await?;
//! let draft = extract(&raw)?;
//! println!("{}", draft.title);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ai`] - Prompt builder, Gemini client, response extraction
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`github`] - GitHub API (auth, issues, labels, pulls)
//! - [`labels`] - Label aggregation across linked issues
//! - [`pipeline`] - The pull request drafting pipeline
//! - [`vcs`] - Git context

// ============================================================================
// Authentication
// ============================================================================

pub use auth::TokenProvider;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{
    ExtractionError, ExtractionErrorKind, PrBuddyError, TransportError, TransportErrorKind,
};

/// Convenience Result type for prbuddy operations.
///
/// This is equivalent to `std::result::Result<T, PrBuddyError>`.
pub type Result<T> = std::result::Result<T, PrBuddyError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AiConfig, AppConfig, GitHubConfig, PrConfig, UiConfig, UserConfig, config_dir,
    config_file_path, load_config,
};

// ============================================================================
// AI
// ============================================================================

pub use ai::{GeneratedPr, GeminiClient, Generator, PromptTemplate};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::auth::TokenSource;
pub use github::issues::{HttpIssueSource, Issue, IssueSource, OctocrabIssueSource};
pub use github::labels::{LabelAction, LabelUpsert};
pub use github::pulls::{MergeMethod, OctocrabPublisher, PublishedPr, Publisher, PullRequestDraft};

// ============================================================================
// Pipeline
// ============================================================================

pub use labels::LabelSet;
pub use pipeline::{
    Collaborators, DraftOutcome, DraftState, PipelineObserver, RunContext, Selector,
    draft_pr, preflight,
};
pub use vcs::{DiffContext, GitCli, Vcs};

// ============================================================================
// Modules
// ============================================================================

pub mod ai;
pub mod auth;
pub mod config;
pub mod error;
pub mod github;
pub mod labels;
pub mod pipeline;
pub mod vcs;
