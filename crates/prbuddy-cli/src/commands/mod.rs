// SPDX-License-Identifier: Apache-2.0

//! Command handlers for prbuddy CLI.

pub mod auth;
pub mod completion;
pub mod issue;
pub mod label;
pub mod pr;
pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use octocrab::Octocrab;
use prbuddy_core::auth::TokenProvider;
use prbuddy_core::github::auth::create_client_with_token;
use prbuddy_core::github::parse_owner_repo;
use prbuddy_core::{AppConfig, PrBuddyError, Vcs};
use tracing::debug;

use crate::cli::{AuthCommand, Commands, IssueCommand, LabelCommand, OutputContext, PrCommand};
use crate::output;
use crate::provider::CliTokenProvider;

/// Creates a styled spinner (only if interactive).
pub(crate) fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Determines the target repository.
///
/// Priority: `--repo` flag > `user.default_repo` config > the remote's URL.
pub(crate) fn resolve_repo(
    flag: Option<&str>,
    config: &AppConfig,
    vcs: &dyn Vcs,
) -> Result<(String, String)> {
    if let Some(repo) = flag.or(config.user.default_repo.as_deref()) {
        return parse_owner_repo(repo);
    }
    let slug = vcs
        .remote_slug()
        .context("Could not determine the repository; pass --repo owner/repo")?;
    debug!(owner = %slug.0, repo = %slug.1, "Using repository from git remote");
    Ok(slug)
}

/// Creates an authenticated GitHub client.
pub(crate) fn github_client(config: &AppConfig) -> Result<Octocrab> {
    let token = CliTokenProvider
        .github_token()
        .ok_or(PrBuddyError::NotAuthenticated)?;
    create_client_with_token(&token, config.github.api_timeout_seconds)
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Pr(PrCommand::Draft(args)) => {
            let outcome = pr::run_draft(args, &ctx, config).await?;
            output::render(&outcome, &ctx)
        }

        Commands::Issue(issue_cmd) => match issue_cmd {
            IssueCommand::List { repo, limit } => {
                let spinner = maybe_spinner(&ctx, "Fetching issues...");
                let result = issue::run_list(repo.as_deref(), limit, config).await;
                if let Some(s) = spinner {
                    s.finish_and_clear();
                }
                output::render(&result?, &ctx)
            }
            IssueCommand::Create {
                repo,
                title,
                body,
                labels,
                assignees,
                dry_run,
            } => {
                let request = issue::CreateRequest {
                    repo,
                    title,
                    body,
                    labels,
                    assignees,
                    dry_run,
                };
                let result = issue::run_create(request, &ctx, config).await?;
                output::render(&result, &ctx)
            }
        },

        Commands::Label(label_cmd) => match label_cmd {
            LabelCommand::Upsert {
                name,
                color,
                description,
                repo,
            } => {
                let result = label::run_upsert(
                    &name,
                    color.as_deref(),
                    description.as_deref(),
                    repo.as_deref(),
                    config,
                )
                .await?;
                output::render(&result, &ctx)
            }
            LabelCommand::Add {
                reference,
                labels,
                repo,
            } => {
                let result = label::run_add(&reference, &labels, repo.as_deref(), config).await?;
                output::render(&result, &ctx)
            }
        },

        Commands::Auth(AuthCommand::Status) => {
            let result = auth::run_status(config).await;
            output::render(&result, &ctx)
        }

        Commands::Completion { shell } => completion::run(shell),
    }
}
