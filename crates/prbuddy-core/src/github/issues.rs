// SPDX-License-Identifier: Apache-2.0

//! Issue listing and creation.
//!
//! Open issues come from one of two sources: the authenticated Octocrab
//! client, or an unauthenticated REST fallback for public repositories when no
//! token is available. Only the first page is fetched.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Public GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// An open issue offered for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Label names in source order, without duplicates.
    pub labels: Vec<String>,
}

impl Issue {
    /// Creates an issue, dropping repeated label names.
    #[must_use]
    pub fn new(number: u64, title: String, labels: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        Self {
            number,
            title,
            labels: unique,
        }
    }

    /// One-line form used in pickers: `#12 Crash on login [bug, p1]`.
    #[must_use]
    pub fn display_line(&self) -> String {
        if self.labels.is_empty() {
            format!("#{} {}", self.number, self.title)
        } else {
            format!("#{} {} [{}]", self.number, self.title, self.labels.join(", "))
        }
    }
}

/// Source of open issues.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Lists up to `limit` open issues (pull requests excluded), first page only.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails.
    async fn list_open_issues(&self, owner: &str, repo: &str, limit: u8) -> Result<Vec<Issue>>;
}

/// [`IssueSource`] backed by an authenticated Octocrab client.
pub struct OctocrabIssueSource {
    client: Octocrab,
}

impl OctocrabIssueSource {
    /// Wraps an authenticated client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueSource for OctocrabIssueSource {
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_open_issues(&self, owner: &str, repo: &str, limit: u8) -> Result<Vec<Issue>> {
        debug!("Fetching open issues");

        let page = self
            .client
            .issues(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(limit)
            .send()
            .await
            .with_context(|| format!("Failed to fetch open issues from {owner}/{repo}"))?;

        let issues: Vec<Issue> = page
            .items
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| {
                Issue::new(
                    issue.number,
                    issue.title,
                    issue.labels.into_iter().map(|label| label.name),
                )
            })
            .collect();

        debug!(count = issues.len(), "Fetched open issues");
        Ok(issues)
    }
}

/// Issue as returned by the REST endpoint (subset).
#[derive(Debug, Deserialize)]
struct RestIssue {
    number: u64,
    title: String,
    #[serde(default)]
    labels: Vec<RestLabel>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RestLabel {
    name: String,
}

/// Unauthenticated [`IssueSource`] using plain HTTP.
///
/// Subject to the anonymous rate limit and only sees public repositories.
pub struct HttpIssueSource {
    http: Client,
    api_base: String,
}

impl HttpIssueSource {
    /// Creates a fallback source against `api_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(api_base: &str, timeout_seconds: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IssueSource for HttpIssueSource {
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_open_issues(&self, owner: &str, repo: &str, limit: u8) -> Result<Vec<Issue>> {
        debug!("Fetching open issues without authentication");

        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_base);
        let per_page = limit.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[("state", "open"), ("per_page", per_page.as_str())])
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("prbuddy/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .with_context(|| format!("Failed to fetch open issues from {owner}/{repo}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "GitHub API error (HTTP {}) listing issues for {owner}/{repo}",
                status.as_u16()
            );
        }

        let raw: Vec<RestIssue> = response
            .json()
            .await
            .context("Failed to parse issue list")?;

        Ok(issues_from_rest(raw))
    }
}

fn issues_from_rest(raw: Vec<RestIssue>) -> Vec<Issue> {
    raw.into_iter()
        .filter(|issue| issue.pull_request.is_none())
        .map(|issue| {
            Issue::new(
                issue.number,
                issue.title,
                issue.labels.into_iter().map(|label| label.name),
            )
        })
        .collect()
}

/// Creates a new GitHub issue.
///
/// Returns the issue URL and issue number.
///
/// # Errors
///
/// Returns an error if the GitHub API call fails.
#[instrument(skip(client, body), fields(owner = %owner, repo = %repo))]
pub async fn create_issue(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    title: &str,
    body: &str,
    labels: &[String],
    assignees: &[String],
) -> Result<(String, u64)> {
    debug!("Creating GitHub issue");

    let handler = client.issues(owner, repo);
    let mut builder = handler.create(title).body(body);
    if !labels.is_empty() {
        builder = builder.labels(labels.to_vec());
    }
    if !assignees.is_empty() {
        builder = builder.assignees(assignees.to_vec());
    }

    let issue = builder
        .send()
        .await
        .with_context(|| format!("Failed to create issue in {owner}/{repo}"))?;

    let issue_url = issue.html_url.to_string();
    let issue_number = issue.number;

    debug!(number = issue_number, url = %issue_url, "Issue created successfully");

    Ok((issue_url, issue_number))
}
