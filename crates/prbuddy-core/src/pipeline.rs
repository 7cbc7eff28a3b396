// SPDX-License-Identifier: Apache-2.0

//! Pull request drafting pipeline.
//!
//! Drives one run from diff to published pull request:
//!
//! ```text
//! Init -> DiffReady -> (EarlyExit | IssuesSelected) -> PromptBuilt -> Generating
//!      -> ResultExtracted -> DraftReady -> (Skipped | Publishing -> Published)
//!      -> [Merging]
//! ```
//!
//! Every external effect goes through a capability trait in [`Collaborators`],
//! so the CLI plugs in git, GitHub, Gemini and a terminal picker while tests
//! plug in fakes.

use std::fmt;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::ai::extract::extract;
use crate::ai::prompt::{self, PromptTemplate};
use crate::ai::provider::Generator;
use crate::auth::{GEMINI_API_KEY_ENV, TokenProvider};
use crate::error::PrBuddyError;
use crate::github::issues::{Issue, IssueSource};
use crate::github::pulls::{MergeMethod, PublishedPr, Publisher, PullRequestDraft};
use crate::labels::aggregate;
use crate::vcs::{DiffContext, Vcs};

/// Human decisions during a run.
///
/// Implementations decide how to ask: an interactive picker, numbered
/// prompts on a plain stream, or a script in tests.
pub trait Selector: Send + Sync {
    /// Lets the human pick any number of `options`; returns their indices.
    fn present(&self, prompt: &str, options: &[String]) -> Result<Vec<usize>>;

    /// Asks a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Lets the human pick one of `options`; returns its index.
    fn choose(&self, prompt: &str, options: &[&str], default: usize) -> Result<usize>;

    /// Asks for a line of text, `default` when left blank.
    fn input(&self, prompt: &str, default: &str) -> Result<String>;

    /// Lets the human edit `text`; returns the edited text.
    fn edit(&self, text: &str) -> Result<String>;
}

/// Pipeline progress, in the order states are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Resolving branches.
    Init,
    /// Diff captured and not empty.
    DiffReady,
    /// Linked issues chosen.
    IssuesSelected,
    /// Prompt assembled.
    PromptBuilt,
    /// Waiting on the generation backend.
    Generating,
    /// Title and description extracted.
    ResultExtracted,
    /// Draft complete, awaiting publish decision.
    DraftReady,
    /// Creating the pull request.
    Publishing,
    /// Pull request created, awaiting merge decision.
    Published,
    /// Merging the pull request.
    Merging,
}

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DraftState::Init => "Resolving branches",
            DraftState::DiffReady => "Collected code differences",
            DraftState::IssuesSelected => "Selected related issues",
            DraftState::PromptBuilt => "Built prompt",
            DraftState::Generating => "Generating title and description",
            DraftState::ResultExtracted => "Extracted title and description",
            DraftState::DraftReady => "Draft ready",
            DraftState::Publishing => "Creating pull request",
            DraftState::Published => "Created pull request",
            DraftState::Merging => "Merging pull request",
        };
        f.write_str(label)
    }
}

/// Receives progress from the pipeline. All methods default to no-ops.
pub trait PipelineObserver: Send + Sync {
    /// Called when the pipeline enters `state`.
    fn enter(&self, _state: DraftState) {}

    /// Called once with the finished draft, before the publish decision.
    fn draft_ready(&self, _draft: &PullRequestDraft) {}

    /// Called for problems the run continues past.
    fn warn(&self, _message: &str) {}
}

/// Inputs of one drafting run.
#[derive(Debug, Clone, bon::Builder)]
pub struct RunContext {
    /// Repository owner.
    #[builder(into)]
    pub owner: String,
    /// Repository name.
    #[builder(into)]
    pub repo: String,
    /// Branch holding the changes; asked for when unset.
    pub source_branch: Option<String>,
    /// Branch to merge into; asked for when unset.
    pub target_branch: Option<String>,
    /// Prompt template.
    #[builder(default = PromptTemplate::Default)]
    pub template: PromptTemplate,
    /// Login to assign to the pull request.
    pub assignee: Option<String>,
    /// Issues to link without asking, in the given order.
    #[builder(default)]
    pub issue_numbers: Vec<u64>,
    /// Open issues fetched for selection.
    #[builder(default = 50)]
    pub issue_limit: u8,
    /// Offer the description for editing before publishing.
    #[builder(default)]
    pub edit: bool,
    /// Never publish.
    #[builder(default)]
    pub dry_run: bool,
    /// Publish without asking.
    #[builder(default)]
    pub yes: bool,
    /// Merge right after publishing, without asking.
    #[builder(default)]
    pub merge: bool,
    /// Strategy used or offered first when merging.
    #[builder(default)]
    pub merge_method: MergeMethod,
}

/// Capabilities the pipeline runs against.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Repository context.
    pub vcs: &'a dyn Vcs,
    /// Open issue listing.
    pub issues: &'a dyn IssueSource,
    /// Human decisions.
    pub selector: &'a dyn Selector,
    /// Generation backend.
    pub generator: &'a dyn Generator,
    /// Pull request creation and merging.
    pub publisher: &'a dyn Publisher,
    /// Progress reporting.
    pub observer: &'a dyn PipelineObserver,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DraftOutcome {
    /// The branches do not differ; nothing was generated.
    EarlyExit {
        /// Source branch.
        source: String,
        /// Target branch.
        target: String,
    },
    /// A draft was generated but not published.
    Skipped {
        /// The unpublished draft.
        draft: PullRequestDraft,
        /// True when publishing was disabled up front.
        dry_run: bool,
    },
    /// The pull request was created.
    Published {
        /// Title it was created with.
        title: String,
        /// Created pull request.
        pr: PublishedPr,
        /// Strategy it was merged with, if merged.
        merged: Option<MergeMethod>,
    },
}

/// Checks what a run needs before anything is asked or sent.
///
/// The Gemini key is checked first, then the git executable, then the
/// working directory. Returns the key.
///
/// # Errors
///
/// Returns `PrBuddyError::Precondition` naming the first missing piece.
pub fn preflight(tokens: &dyn TokenProvider, vcs: &dyn Vcs) -> crate::Result<SecretString> {
    let key = tokens.gemini_key().ok_or_else(|| PrBuddyError::Precondition {
        message: format!("the {GEMINI_API_KEY_ENV} environment variable is not set"),
    })?;

    if !vcs.is_available() {
        return Err(PrBuddyError::Precondition {
            message: "git is not installed or not on PATH".to_string(),
        });
    }

    if !vcs.is_inside_work_tree()? {
        return Err(PrBuddyError::Precondition {
            message: "not inside a git repository".to_string(),
        });
    }

    debug!("Pre-flight checks passed");
    Ok(key)
}

/// Runs the drafting pipeline once.
///
/// # Errors
///
/// Returns an error when git fails, when generation or extraction fails
/// (`PrBuddyError::Transport` / `PrBuddyError::Extraction`), or when the
/// pull request cannot be created or merged. Issue listing failures are
/// reported through the observer and do not stop the run.
#[instrument(skip_all, fields(owner = %ctx.owner, repo = %ctx.repo))]
pub async fn draft_pr(ctx: &RunContext, deps: &Collaborators<'_>) -> Result<DraftOutcome> {
    let observer = deps.observer;
    observer.enter(DraftState::Init);

    let diff = collect_diff(ctx, deps)?;
    if diff.is_empty() {
        info!(source = %diff.source_branch, target = %diff.target_branch, "No differences");
        return Ok(DraftOutcome::EarlyExit {
            source: diff.source_branch,
            target: diff.target_branch,
        });
    }
    observer.enter(DraftState::DiffReady);

    let issues = select_issues(ctx, deps).await?;
    observer.enter(DraftState::IssuesSelected);

    let prompt_text = prompt::build(&ctx.template, &issues, &diff.raw_diff);
    debug!(prompt_len = prompt_text.len(), issues = issues.len(), "Prompt built");
    observer.enter(DraftState::PromptBuilt);

    observer.enter(DraftState::Generating);
    let raw = deps
        .generator
        .generate(&prompt_text)
        .await
        .map_err(PrBuddyError::from)?;
    let generated = extract(&raw).map_err(PrBuddyError::from)?;
    observer.enter(DraftState::ResultExtracted);

    let description = if ctx.edit {
        let edited = deps.selector.edit(&generated.description)?;
        let edited = edited.trim();
        if edited.is_empty() {
            observer.warn("Edited description is empty; keeping the generated one");
            generated.description
        } else {
            edited.to_string()
        }
    } else {
        generated.description
    };

    let draft = PullRequestDraft::builder()
        .title(generated.title)
        .description(description)
        .base(diff.target_branch)
        .head(diff.source_branch)
        .labels(aggregate(&issues))
        .maybe_assignee(ctx.assignee.clone())
        .build();
    observer.draft_ready(&draft);
    observer.enter(DraftState::DraftReady);

    if ctx.dry_run {
        return Ok(DraftOutcome::Skipped {
            draft,
            dry_run: true,
        });
    }
    if !ctx.yes
        && !deps
            .selector
            .confirm("Create a GitHub pull request with this?", true)?
    {
        return Ok(DraftOutcome::Skipped {
            draft,
            dry_run: false,
        });
    }

    observer.enter(DraftState::Publishing);
    let title = draft.title.clone();
    let pr = deps.publisher.create(&ctx.owner, &ctx.repo, draft).await?;
    for warning in &pr.warnings {
        observer.warn(warning);
    }
    info!(number = pr.number, url = %pr.url, "Pull request created");
    observer.enter(DraftState::Published);

    let merged = match merge_decision(ctx, deps, &pr)? {
        Some(method) => {
            observer.enter(DraftState::Merging);
            deps.publisher
                .merge(&ctx.owner, &ctx.repo, pr.number, method)
                .await
                .with_context(|| format!("Pull request #{} was created at {}", pr.number, pr.url))?;
            Some(method)
        }
        None => None,
    };

    Ok(DraftOutcome::Published { title, pr, merged })
}

/// Resolves branches, fetches the target, and captures the diff.
fn collect_diff(ctx: &RunContext, deps: &Collaborators<'_>) -> Result<DiffContext> {
    let vcs = deps.vcs;

    let source = match &ctx.source_branch {
        Some(branch) => branch.clone(),
        None => {
            let current = vcs.current_branch()?;
            deps.selector.input("Source branch (from)", &current)?
        }
    };
    let target = match &ctx.target_branch {
        Some(branch) => branch.clone(),
        None => {
            let default = vcs.default_remote_branch()?;
            deps.selector.input("Target branch (to)", &default)?
        }
    };
    debug!(source = %source, target = %target, "Comparing branches");

    vcs.fetch(&target)?;
    let raw = vcs.diff(&format!("{}/{target}", vcs.remote()), &source)?;
    Ok(DiffContext::new(source, target, raw))
}

/// Lists open issues and lets the human link some of them.
///
/// Selection keeps display order. A listing failure yields no issues.
async fn select_issues(ctx: &RunContext, deps: &Collaborators<'_>) -> Result<Vec<Issue>> {
    let listed = match deps
        .issues
        .list_open_issues(&ctx.owner, &ctx.repo, ctx.issue_limit)
        .await
    {
        Ok(listed) => listed,
        Err(e) => {
            warn!(error = %e, "Issue listing failed");
            deps.observer
                .warn(&format!("Could not fetch open issues ({e:#}); continuing without them"));
            return Ok(Vec::new());
        }
    };

    if listed.is_empty() {
        deps.observer.warn("No open issues found");
        return Ok(Vec::new());
    }

    if !ctx.issue_numbers.is_empty() {
        let mut picked = Vec::new();
        for number in &ctx.issue_numbers {
            match listed.iter().find(|issue| issue.number == *number) {
                Some(issue) if !picked.contains(issue) => picked.push(issue.clone()),
                Some(_) => {}
                None => deps
                    .observer
                    .warn(&format!("Issue #{number} is not an open issue; skipping")),
            }
        }
        return Ok(picked);
    }

    let options: Vec<String> = listed.iter().map(Issue::display_line).collect();
    let mut indices = deps.selector.present("Select related issues", &options)?;
    indices.sort_unstable();
    indices.dedup();

    Ok(indices
        .into_iter()
        .filter_map(|index| listed.get(index).cloned())
        .collect())
}

/// Decides whether and how to merge a freshly published pull request.
fn merge_decision(
    ctx: &RunContext,
    deps: &Collaborators<'_>,
    pr: &PublishedPr,
) -> Result<Option<MergeMethod>> {
    if ctx.merge {
        return Ok(Some(ctx.merge_method));
    }
    if ctx.yes {
        return Ok(None);
    }
    if !deps
        .selector
        .confirm(&format!("Merge pull request #{} now?", pr.number), false)?
    {
        return Ok(None);
    }

    let names: Vec<&str> = MergeMethod::ALL.iter().map(|m| m.as_str()).collect();
    let default = MergeMethod::ALL
        .iter()
        .position(|m| *m == ctx.merge_method)
        .unwrap_or_default();
    let index = deps.selector.choose("Merge strategy", &names, default)?;
    Ok(MergeMethod::ALL.get(index).copied())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{ExtractionErrorKind, TransportError, TransportErrorKind};

    struct FakeVcs {
        available: bool,
        diff: String,
        fetched: Mutex<Vec<String>>,
        diffed: Mutex<Vec<(String, String)>>,
    }

    impl FakeVcs {
        fn with_diff(diff: &str) -> Self {
            Self {
                available: true,
                diff: diff.to_string(),
                fetched: Mutex::new(Vec::new()),
                diffed: Mutex::new(Vec::new()),
            }
        }
    }

    impl Vcs for FakeVcs {
        fn remote(&self) -> &str {
            "origin"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn is_inside_work_tree(&self) -> crate::Result<bool> {
            Ok(true)
        }

        fn current_branch(&self) -> crate::Result<String> {
            Ok("feature/token-refresh".to_string())
        }

        fn default_remote_branch(&self) -> crate::Result<String> {
            Ok("main".to_string())
        }

        fn fetch(&self, branch: &str) -> crate::Result<()> {
            self.fetched.lock().unwrap().push(branch.to_string());
            Ok(())
        }

        fn diff(&self, base: &str, head: &str) -> crate::Result<String> {
            self.diffed
                .lock()
                .unwrap()
                .push((base.to_string(), head.to_string()));
            Ok(self.diff.clone())
        }

        fn remote_slug(&self) -> crate::Result<(String, String)> {
            Ok(("octocat".to_string(), "hello".to_string()))
        }
    }

    struct FakeIssues {
        issues: Option<Vec<Issue>>,
        calls: AtomicUsize,
    }

    impl FakeIssues {
        fn new(issues: Vec<Issue>) -> Self {
            Self {
                issues: Some(issues),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                issues: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IssueSource for FakeIssues {
        async fn list_open_issues(&self, _: &str, _: &str, _: u8) -> Result<Vec<Issue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.issues
                .clone()
                .ok_or_else(|| anyhow::anyhow!("HTTP 503 from GitHub"))
        }
    }

    /// Answers from a script; input() always takes the default.
    struct ScriptedSelector {
        selection: Vec<usize>,
        confirms: Mutex<VecDeque<bool>>,
        choice: usize,
        edited: Option<String>,
        presented: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedSelector {
        fn new(selection: Vec<usize>, confirms: &[bool]) -> Self {
            Self {
                selection,
                confirms: Mutex::new(confirms.iter().copied().collect()),
                choice: 0,
                edited: None,
                presented: Mutex::new(Vec::new()),
            }
        }
    }

    impl Selector for ScriptedSelector {
        fn present(&self, _: &str, options: &[String]) -> Result<Vec<usize>> {
            self.presented.lock().unwrap().push(options.to_vec());
            Ok(self.selection.clone())
        }

        fn confirm(&self, prompt: &str, _: bool) -> Result<bool> {
            self.confirms
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("unexpected confirmation: {prompt}"))
        }

        fn choose(&self, _: &str, _: &[&str], _: usize) -> Result<usize> {
            Ok(self.choice)
        }

        fn input(&self, _: &str, default: &str) -> Result<String> {
            Ok(default.to_string())
        }

        fn edit(&self, text: &str) -> Result<String> {
            Ok(self.edited.clone().unwrap_or_else(|| text.to_string()))
        }
    }

    struct FakeGenerator {
        reply: std::result::Result<String, TransportError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn replying(inner: &str) -> Self {
            let envelope = serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": inner }] }, "finishReason": "STOP" }]
            });
            Self {
                reply: Ok(envelope.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        async fn generate(&self, prompt: &str) -> std::result::Result<String, TransportError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        created: Mutex<Vec<PullRequestDraft>>,
        merged: Mutex<Vec<(u64, MergeMethod)>>,
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        async fn create(&self, owner: &str, repo: &str, draft: PullRequestDraft) -> Result<PublishedPr> {
            self.created.lock().unwrap().push(draft);
            Ok(PublishedPr {
                number: 42,
                url: format!("https://github.com/{owner}/{repo}/pull/42"),
                warnings: Vec::new(),
            })
        }

        async fn merge(&self, _: &str, _: &str, number: u64, method: MergeMethod) -> Result<()> {
            self.merged.lock().unwrap().push((number, method));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        states: Mutex<Vec<DraftState>>,
        warnings: Mutex<Vec<String>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn enter(&self, state: DraftState) {
            self.states.lock().unwrap().push(state);
        }

        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
    }

    struct EnvTokens(Option<&'static str>);

    impl TokenProvider for EnvTokens {
        fn github_token(&self) -> Option<SecretString> {
            None
        }

        fn gemini_key(&self) -> Option<SecretString> {
            self.0.map(SecretString::from)
        }
    }

    const GOOD_REPLY: &str = r####"{"title":"fix(auth): patch token refresh","description":"### 🐛 Bug Fixes\n* Refresh tokens before they expire Fixes #1"}"####;

    fn sample_issues() -> Vec<Issue> {
        vec![
            Issue::new(1, "Token expires early".into(), ["bug", "p1"].map(String::from)),
            Issue::new(2, "Login button misaligned".into(), ["p1", "ui"].map(String::from)),
            Issue::new(3, "Docs typo".into(), ["docs"].map(String::from)),
        ]
    }

    fn context() -> RunContext {
        RunContext::builder().owner("octocat").repo("hello").build()
    }

    struct Harness {
        vcs: FakeVcs,
        issues: FakeIssues,
        selector: ScriptedSelector,
        generator: FakeGenerator,
        publisher: FakePublisher,
        observer: RecordingObserver,
    }

    impl Harness {
        fn new(diff: &str, selector: ScriptedSelector) -> Self {
            Self {
                vcs: FakeVcs::with_diff(diff),
                issues: FakeIssues::new(sample_issues()),
                selector,
                generator: FakeGenerator::replying(GOOD_REPLY),
                publisher: FakePublisher::default(),
                observer: RecordingObserver::default(),
            }
        }

        fn deps(&self) -> Collaborators<'_> {
            Collaborators {
                vcs: &self.vcs,
                issues: &self.issues,
                selector: &self.selector,
                generator: &self.generator,
                publisher: &self.publisher,
                observer: &self.observer,
            }
        }
    }

    #[tokio::test]
    async fn empty_diff_exits_early_without_generating() {
        let harness = Harness::new("  \n", ScriptedSelector::new(vec![], &[]));

        let outcome = draft_pr(&context(), &harness.deps()).await.unwrap();

        assert_eq!(
            outcome,
            DraftOutcome::EarlyExit {
                source: "feature/token-refresh".to_string(),
                target: "main".to_string(),
            }
        );
        assert_eq!(harness.generator.calls(), 0);
        assert_eq!(harness.issues.calls.load(Ordering::SeqCst), 0);
        assert!(harness.publisher.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publishes_draft_with_aggregated_labels() {
        // Picked out of display order on purpose
        let harness = Harness::new("+refresh()\n", ScriptedSelector::new(vec![1, 0], &[true, false]));

        let outcome = draft_pr(&context(), &harness.deps()).await.unwrap();

        let created = harness.publisher.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        let draft = &created[0];
        assert_eq!(draft.title, "fix(auth): patch token refresh");
        assert_eq!(
            draft.description,
            "### 🐛 Bug Fixes\n* Refresh tokens before they expire Fixes #1"
        );
        assert_eq!(draft.labels.as_slice(), ["bug", "p1", "ui"]);
        assert_eq!(draft.base, "main");
        assert_eq!(draft.head, "feature/token-refresh");

        let prompts = harness.generator.prompts.lock().unwrap();
        let first = prompts[0].find("- Token expires early #1").unwrap();
        let second = prompts[0].find("- Login button misaligned #2").unwrap();
        assert!(first < second);
        assert!(!prompts[0].contains("Docs typo"));

        assert_eq!(*harness.vcs.fetched.lock().unwrap(), ["main"]);
        assert_eq!(
            *harness.vcs.diffed.lock().unwrap(),
            [("origin/main".to_string(), "feature/token-refresh".to_string())]
        );

        match outcome {
            DraftOutcome::Published { title, pr, merged } => {
                assert_eq!(title, "fix(auth): patch token refresh");
                assert_eq!(pr.number, 42);
                assert_eq!(merged, None);
            }
            other => panic!("expected Published, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn declining_skips_publish() {
        let harness = Harness::new("+x\n", ScriptedSelector::new(vec![], &[false]));

        let outcome = draft_pr(&context(), &harness.deps()).await.unwrap();

        assert!(matches!(
            outcome,
            DraftOutcome::Skipped { dry_run: false, .. }
        ));
        assert!(harness.publisher.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_never_asks_or_publishes() {
        // No confirmations scripted: any confirm() call would fail the run
        let harness = Harness::new("+x\n", ScriptedSelector::new(vec![0], &[]));
        let ctx = RunContext::builder()
            .owner("octocat")
            .repo("hello")
            .dry_run(true)
            .build();

        let outcome = draft_pr(&ctx, &harness.deps()).await.unwrap();

        match outcome {
            DraftOutcome::Skipped { draft, dry_run } => {
                assert!(dry_run);
                assert_eq!(draft.labels.as_slice(), ["bug", "p1"]);
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert!(harness.publisher.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn issue_listing_failure_is_a_warning() {
        let mut harness = Harness::new("+x\n", ScriptedSelector::new(vec![0], &[]));
        harness.issues = FakeIssues::failing();
        let ctx = RunContext::builder()
            .owner("octocat")
            .repo("hello")
            .dry_run(true)
            .build();

        let outcome = draft_pr(&ctx, &harness.deps()).await.unwrap();

        assert!(matches!(outcome, DraftOutcome::Skipped { .. }));
        let warnings = harness.observer.warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("HTTP 503"));
        assert!(harness.selector.presented.lock().unwrap().is_empty());
        assert_eq!(harness.generator.calls(), 1);
    }

    #[tokio::test]
    async fn schema_failure_is_fatal_and_typed() {
        let mut harness = Harness::new("+x\n", ScriptedSelector::new(vec![], &[true]));
        harness.generator = FakeGenerator::replying("Here you go: {\"title\":\"t\"}");

        let err = draft_pr(&context(), &harness.deps()).await.unwrap_err();

        match err.downcast_ref::<PrBuddyError>() {
            Some(PrBuddyError::Extraction(e)) => {
                assert_eq!(e.kind, ExtractionErrorKind::SchemaMalformed);
                assert!(e.raw_payload.starts_with("Here you go"));
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
        assert!(harness.publisher.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_fatal_and_typed() {
        let mut harness = Harness::new("+x\n", ScriptedSelector::new(vec![], &[true]));
        harness.generator.reply = Err(TransportError::service("API key not valid", Some(400)));

        let err = draft_pr(&context(), &harness.deps()).await.unwrap_err();

        match err.downcast_ref::<PrBuddyError>() {
            Some(PrBuddyError::Transport(e)) => {
                assert_eq!(e.kind, TransportErrorKind::ServiceError);
                assert_eq!(e.status, Some(400));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preselected_issues_skip_the_picker() {
        let harness = Harness::new("+x\n", ScriptedSelector::new(vec![0], &[]));
        let ctx = RunContext::builder()
            .owner("octocat")
            .repo("hello")
            .issue_numbers(vec![3, 99, 1])
            .dry_run(true)
            .build();

        let outcome = draft_pr(&ctx, &harness.deps()).await.unwrap();

        let DraftOutcome::Skipped { draft, .. } = outcome else {
            panic!("expected Skipped");
        };
        assert_eq!(draft.labels.as_slice(), ["docs", "bug", "p1"]);
        assert!(harness.selector.presented.lock().unwrap().is_empty());
        let warnings = harness.observer.warnings.lock().unwrap();
        assert!(warnings[0].contains("#99"));
    }

    #[tokio::test]
    async fn merge_flag_merges_with_configured_method() {
        let harness = Harness::new("+x\n", ScriptedSelector::new(vec![], &[]));
        let ctx = RunContext::builder()
            .owner("octocat")
            .repo("hello")
            .yes(true)
            .merge(true)
            .build();

        let outcome = draft_pr(&ctx, &harness.deps()).await.unwrap();

        assert!(matches!(
            outcome,
            DraftOutcome::Published {
                merged: Some(MergeMethod::Squash),
                ..
            }
        ));
        assert_eq!(
            *harness.publisher.merged.lock().unwrap(),
            [(42, MergeMethod::Squash)]
        );
        assert!(
            harness
                .observer
                .states
                .lock()
                .unwrap()
                .ends_with(&[
                    DraftState::Publishing,
                    DraftState::Published,
                    DraftState::Merging
                ])
        );
    }

    /// Notes the last observed state each time a confirmation is asked.
    struct StateAwareSelector<'a> {
        inner: ScriptedSelector,
        observer: &'a RecordingObserver,
        asked: Mutex<Vec<(String, Option<DraftState>)>>,
    }

    impl Selector for StateAwareSelector<'_> {
        fn present(&self, prompt: &str, options: &[String]) -> Result<Vec<usize>> {
            self.inner.present(prompt, options)
        }

        fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
            let last = self.observer.states.lock().unwrap().last().copied();
            self.asked.lock().unwrap().push((prompt.to_string(), last));
            self.inner.confirm(prompt, default)
        }

        fn choose(&self, prompt: &str, options: &[&str], default: usize) -> Result<usize> {
            self.inner.choose(prompt, options, default)
        }

        fn input(&self, prompt: &str, default: &str) -> Result<String> {
            self.inner.input(prompt, default)
        }

        fn edit(&self, text: &str) -> Result<String> {
            self.inner.edit(text)
        }
    }

    #[tokio::test]
    async fn merge_prompt_is_asked_after_publishing_finishes() {
        let harness = Harness::new("+x\n", ScriptedSelector::new(vec![], &[]));
        let selector = StateAwareSelector {
            inner: ScriptedSelector::new(vec![], &[true, true]),
            observer: &harness.observer,
            asked: Mutex::new(Vec::new()),
        };
        let deps = Collaborators {
            selector: &selector,
            ..harness.deps()
        };

        draft_pr(&context(), &deps).await.unwrap();

        let asked = selector.asked.lock().unwrap();
        assert_eq!(asked.len(), 2);
        assert_eq!(asked[0].1, Some(DraftState::DraftReady));
        assert_eq!(asked[1].0, "Merge pull request #42 now?");
        assert_eq!(asked[1].1, Some(DraftState::Published));
    }

    #[tokio::test]
    async fn interactive_merge_uses_chosen_strategy() {
        let mut selector = ScriptedSelector::new(vec![], &[true, true]);
        selector.choice = 2;
        let harness = Harness::new("+x\n", selector);

        draft_pr(&context(), &harness.deps()).await.unwrap();

        assert_eq!(
            *harness.publisher.merged.lock().unwrap(),
            [(42, MergeMethod::Rebase)]
        );
    }

    #[tokio::test]
    async fn edited_description_replaces_generated() {
        let mut selector = ScriptedSelector::new(vec![], &[]);
        selector.edited = Some("\n### Edited\n".to_string());
        let harness = Harness::new("+x\n", selector);
        let ctx = RunContext::builder()
            .owner("octocat")
            .repo("hello")
            .edit(true)
            .dry_run(true)
            .build();

        let DraftOutcome::Skipped { draft, .. } = draft_pr(&ctx, &harness.deps()).await.unwrap()
        else {
            panic!("expected Skipped");
        };
        assert_eq!(draft.description, "### Edited");
    }

    #[test]
    fn preflight_checks_key_first() {
        let mut vcs = FakeVcs::with_diff("");
        vcs.available = false;

        let err = preflight(&EnvTokens(None), &vcs).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = preflight(&EnvTokens(Some("key")), &vcs).unwrap_err();
        assert!(err.to_string().contains("git is not installed"));

        vcs.available = true;
        assert!(preflight(&EnvTokens(Some("key")), &vcs).is_ok());
    }
}
