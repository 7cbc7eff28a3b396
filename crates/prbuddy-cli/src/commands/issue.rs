// SPDX-License-Identifier: Apache-2.0

//! Issue listing and creation commands.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use dialoguer::Input;
use prbuddy_core::auth::TokenProvider;
use prbuddy_core::github::auth::create_client_with_token;
use prbuddy_core::github::issues::{GITHUB_API_BASE, create_issue};
use prbuddy_core::{AppConfig, GitCli, HttpIssueSource, IssueSource, OctocrabIssueSource};
use tracing::debug;

use super::types::{IssueCreateResult, IssueListResult};
use super::{github_client, maybe_spinner, resolve_repo};
use crate::cli::OutputContext;
use crate::provider::CliTokenProvider;

/// Maximum issue title length accepted by GitHub.
const MAX_TITLE_LEN: usize = 256;

/// Lists open issues (first page only).
///
/// Works without a token for public repositories.
pub async fn run_list(
    repo: Option<&str>,
    limit: Option<u8>,
    config: &AppConfig,
) -> Result<IssueListResult> {
    let vcs = GitCli::new(config.github.remote.clone());
    let (owner, name) = resolve_repo(repo, config, &vcs)?;
    let limit = limit.unwrap_or(config.github.issue_page_size);
    let timeout = config.github.api_timeout_seconds;

    let source: Box<dyn IssueSource> = match CliTokenProvider.github_token() {
        Some(token) => Box::new(OctocrabIssueSource::new(create_client_with_token(
            &token, timeout,
        )?)),
        None => {
            debug!("No GitHub token; listing issues anonymously");
            Box::new(HttpIssueSource::new(GITHUB_API_BASE, timeout)?)
        }
    };

    let issues = source.list_open_issues(&owner, &name, limit).await?;
    Ok(IssueListResult {
        repo: format!("{owner}/{name}"),
        issues,
    })
}

/// Arguments of `issue create`.
pub struct CreateRequest {
    pub repo: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub dry_run: bool,
}

/// Creates an issue, asking for a missing title or body.
pub async fn run_create(
    request: CreateRequest,
    ctx: &OutputContext,
    config: &AppConfig,
) -> Result<IssueCreateResult> {
    let vcs = GitCli::new(config.github.remote.clone());
    let (owner, repo) = resolve_repo(request.repo.as_deref(), config, &vcs)?;

    let title = match request.title {
        Some(title) => validate_title(&title)?,
        None => prompt_title()?,
    };
    let body = match request.body {
        Some(body) => body,
        None => prompt_body()?,
    };

    let mut result = IssueCreateResult {
        repo: format!("{owner}/{repo}"),
        issue_url: String::new(),
        issue_number: 0,
        title,
        body,
        labels: request.labels,
        assignees: request.assignees,
        dry_run: request.dry_run,
    };
    if request.dry_run {
        return Ok(result);
    }

    let client = github_client(config)?;
    let spinner = maybe_spinner(ctx, "Creating issue...");
    let created = create_issue(
        &client,
        &owner,
        &repo,
        &result.title,
        &result.body,
        &result.labels,
        &result.assignees,
    )
    .await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let (url, number) = created?;
    result.issue_url = url;
    result.issue_number = number;
    Ok(result)
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Title cannot be empty");
    }
    if title.chars().count() > MAX_TITLE_LEN {
        anyhow::bail!("Title must be {MAX_TITLE_LEN} characters or less");
    }
    Ok(title.to_string())
}

/// Prompt user for issue title interactively. Requires TTY.
fn prompt_title() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Interactive mode requires a terminal. Use --title flag instead.");
    }

    let title = Input::<String>::new()
        .with_prompt("Issue title")
        .validate_with(|input: &String| validate_title(input).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .context("Failed to read title from input")?;

    Ok(title.trim().to_string())
}

/// Prompt user for issue body interactively. Requires TTY.
fn prompt_body() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Interactive mode requires a terminal. Use --body flag instead.");
    }

    let body = Input::<String>::new()
        .with_prompt("Issue description (use --body for multiline)")
        .allow_empty(false)
        .interact_text()
        .context("Failed to read body from input")?;

    Ok(body)
}
