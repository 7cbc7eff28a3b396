// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data instead of printing directly; the `output`
//! module renders them in the selected format.

use prbuddy_core::Issue;
use prbuddy_core::github::auth::TokenSource;
use serde::Serialize;

/// Result from the auth status command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthStatusResult {
    /// Whether a GitHub token was found.
    pub authenticated: bool,
    /// Where the token came from.
    pub method: Option<TokenSource>,
    /// GitHub login, when the token could be checked.
    pub username: Option<String>,
    /// Whether `GEMINI_API_KEY` is set.
    pub gemini_key_set: bool,
}

/// Result from the issue list command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssueListResult {
    /// Repository as `owner/repo`.
    pub repo: String,
    /// Open issues, first page only.
    pub issues: Vec<Issue>,
}

/// Result from the issue create command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssueCreateResult {
    /// Repository as `owner/repo`.
    pub repo: String,
    /// Issue URL (empty for dry runs).
    pub issue_url: String,
    /// Issue number (0 for dry runs).
    pub issue_number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Labels applied on creation.
    pub labels: Vec<String>,
    /// Logins assigned on creation.
    pub assignees: Vec<String>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Result from the label add command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LabelsAddedResult {
    /// Repository as `owner/repo`.
    pub repo: String,
    /// Issue or pull request number.
    pub number: u64,
    /// Labels requested.
    pub requested: Vec<String>,
    /// Labels on the issue afterwards.
    pub labels: Vec<String>,
}
