// SPDX-License-Identifier: Apache-2.0

//! Pull request drafting command.

use std::io::{self, BufReader, Write};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use console::style;
use indicatif::ProgressBar;
use prbuddy_core::auth::TokenProvider;
use prbuddy_core::github::auth::{create_anonymous_client, create_client_with_token};
use prbuddy_core::github::issues::GITHUB_API_BASE;
use prbuddy_core::{
    AppConfig, Collaborators, DraftOutcome, DraftState, GeminiClient, HttpIssueSource,
    IssueSource, OctocrabIssueSource, OctocrabPublisher, PipelineObserver, PrBuddyError,
    PromptTemplate, PullRequestDraft, RunContext, Selector, draft_pr, preflight,
};
use prbuddy_core::{GitCli, Generator};
use tracing::{debug, warn};

use super::{maybe_spinner, resolve_repo};
use crate::cli::{DraftArgs, OutputContext, OutputFormat};
use crate::output::pr::write_draft_preview;
use crate::provider::CliTokenProvider;
use crate::select::{DialoguerSelector, IndexSelector};

/// Reports pipeline progress on the terminal.
///
/// Spinners run only while waiting on the network, so they never overlap a
/// prompt.
struct TerminalObserver<'a> {
    ctx: &'a OutputContext,
    spinner: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalObserver<'a> {
    fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: Mutex::new(None),
        }
    }

    /// Prints the draft for text output. Returns whether it was written.
    fn show_preview(&self, out: &mut dyn Write, draft: &PullRequestDraft) -> bool {
        if !matches!(self.ctx.format, OutputFormat::Text) {
            return false;
        }
        match write_draft_preview(out, draft) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to print draft preview");
                false
            }
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(s) = spinner.take()
        {
            s.finish_and_clear();
        }
    }
}

impl PipelineObserver for TerminalObserver<'_> {
    fn enter(&self, state: DraftState) {
        self.stop_spinner();
        debug!(%state, "Pipeline state");

        match state {
            DraftState::Generating | DraftState::Publishing | DraftState::Merging => {
                if let Ok(mut spinner) = self.spinner.lock() {
                    *spinner = maybe_spinner(self.ctx, &format!("{state}..."));
                }
            }
            DraftState::DiffReady
            | DraftState::IssuesSelected
            | DraftState::ResultExtracted
            | DraftState::Published => {
                if self.ctx.is_interactive() {
                    eprintln!("{} {state}", style("*").green().bold());
                }
            }
            DraftState::Init | DraftState::PromptBuilt | DraftState::DraftReady => {
                if self.ctx.verbose {
                    eprintln!("{} {state}", style("-").dim());
                }
            }
        }
    }

    fn draft_ready(&self, draft: &PullRequestDraft) {
        self.stop_spinner();
        self.show_preview(&mut io::stdout(), draft);
    }

    fn warn(&self, message: &str) {
        if let Ok(spinner) = self.spinner.lock()
            && let Some(s) = spinner.as_ref()
        {
            s.suspend(|| eprintln!("{} {message}", style("!").yellow().bold()));
            return;
        }
        eprintln!("{} {message}", style("!").yellow().bold());
    }
}

impl Drop for TerminalObserver<'_> {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

/// Picks the prompt template. Flags win over config; a file wins over a name.
fn resolve_template(args: &DraftArgs, config: &AppConfig) -> Result<PromptTemplate> {
    if let Some(path) = &args.template_file {
        return PromptTemplate::load(path);
    }
    let name = match &args.template {
        Some(name) => name,
        None => {
            if let Some(path) = &config.pr.template_file {
                return PromptTemplate::load(path);
            }
            &config.pr.template
        }
    };

    match PromptTemplate::builtin(name) {
        Some(template) => Ok(template),
        None => bail!("Unknown template '{name}'. Expected one of: default, detailed"),
    }
}

/// Builds the run context from flags and configuration.
fn run_context(
    args: &DraftArgs,
    config: &AppConfig,
    owner: String,
    repo: String,
    template: PromptTemplate,
) -> RunContext {
    RunContext::builder()
        .owner(owner)
        .repo(repo)
        .maybe_source_branch(args.from.clone())
        .maybe_target_branch(args.to.clone())
        .template(template)
        .maybe_assignee(args.assignee.clone().or_else(|| config.pr.assignee.clone()))
        .issue_numbers(args.issues.clone())
        .issue_limit(config.github.issue_page_size)
        .edit(args.edit || config.pr.edit_before_publish)
        .dry_run(args.dry_run)
        .yes(args.yes || !config.ui.confirm_before_publish)
        .merge(args.merge)
        .merge_method(args.merge_method.unwrap_or(config.pr.merge_method))
        .build()
}

/// Runs `pr draft`.
pub async fn run_draft(
    args: DraftArgs,
    ctx: &OutputContext,
    config: &AppConfig,
) -> Result<DraftOutcome> {
    let tokens = CliTokenProvider;
    let vcs = GitCli::new(config.github.remote.clone());
    let api_key = preflight(&tokens, &vcs)?;

    let (owner, repo) = resolve_repo(args.repo.as_deref(), config, &vcs)?;
    let template = resolve_template(&args, config)?;
    debug!(template = template.name(), "Template selected");

    let github_token = tokens.github_token();
    if github_token.is_none() && !args.dry_run {
        return Err(PrBuddyError::NotAuthenticated.into());
    }

    let timeout = config.github.api_timeout_seconds;
    // Without a token only public issues can be listed; nothing gets published
    let (client, issues) = match &github_token {
        Some(token) => {
            let client = create_client_with_token(token, timeout)?;
            let issues: Box<dyn IssueSource> = Box::new(OctocrabIssueSource::new(client.clone()));
            (client, issues)
        }
        None => {
            let issues: Box<dyn IssueSource> =
                Box::new(HttpIssueSource::new(GITHUB_API_BASE, timeout)?);
            (create_anonymous_client(timeout)?, issues)
        }
    };
    let publisher = OctocrabPublisher::new(client);
    let generator =
        GeminiClient::with_api_key(api_key, &config.ai).context("Failed to set up Gemini")?;
    debug!(model = generator.model(), "Generator ready");

    let selector: Box<dyn Selector> = if ctx.can_prompt() {
        Box::new(DialoguerSelector)
    } else {
        Box::new(IndexSelector::new(BufReader::new(io::stdin()), io::stderr()))
    };
    let observer = TerminalObserver::new(ctx);

    let run = run_context(&args, config, owner, repo, template);
    let deps = Collaborators {
        vcs: &vcs,
        issues: issues.as_ref(),
        selector: selector.as_ref(),
        generator: &generator,
        publisher: &publisher,
        observer: &observer,
    };

    draft_pr(&run, &deps).await
}
