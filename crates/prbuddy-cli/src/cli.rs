// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for prbuddy.
//!
//! Uses clap's derive API for declarative CLI parsing with hierarchical
//! noun-verb subcommands for autocomplete-optimal design.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use prbuddy_core::MergeMethod;

/// Extended help text for the completion command with shell-specific examples.
const COMPLETION_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(prbuddy completion bash)"

  zsh
    Generate completion file:
      mkdir -p ~/.zsh/completions
      prbuddy completion zsh > ~/.zsh/completions/_prbuddy

    Add to ~/.zshrc (before compinit):
      fpath=(~/.zsh/completions $fpath)
      autoload -U compinit && compinit -i

  fish
    Generate completion file:
      prbuddy completion fish > ~/.config/fish/completions/prbuddy.fish

  PowerShell
    Add to $PROFILE:
      prbuddy completion powershell | Out-String | Invoke-Expression
"#;

/// Output format for CLI results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
    /// Markdown output, ready to paste into GitHub
    Markdown,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json, yaml, markdown)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, progress)
    pub quiet: bool,
    /// Enable verbose output
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }

    /// Returns true when prompts can use the full-screen pickers.
    pub fn can_prompt(&self) -> bool {
        self.is_tty && std::io::stdin().is_terminal()
    }
}

/// prbuddy - AI-drafted pull requests and GitHub workflow helpers.
///
/// Reads the diff between two branches, lets you link open issues, asks
/// Gemini for a title and description, and opens the pull request.
#[derive(Parser)]
#[command(name = "prbuddy")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json, yaml, markdown)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, progress)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Override configured Gemini model (e.g., gemini-2.5-flash)
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Draft and publish pull requests
    #[command(subcommand)]
    Pr(PrCommand),

    /// List and create issues
    #[command(subcommand)]
    Issue(IssueCommand),

    /// Manage repository labels
    #[command(subcommand)]
    Label(LabelCommand),

    /// Show GitHub authentication status
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Print a shell completion script
    #[command(after_long_help = COMPLETION_HELP)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Pull request commands.
#[derive(Subcommand)]
pub enum PrCommand {
    /// Draft a pull request from the branch diff with Gemini
    Draft(DraftArgs),
}

/// Arguments of `pr draft`.
#[derive(Args)]
pub struct DraftArgs {
    /// Branch holding the changes (asked for when omitted)
    #[arg(long)]
    pub from: Option<String>,

    /// Branch to merge into (asked for when omitted)
    #[arg(long)]
    pub to: Option<String>,

    /// Built-in prompt template (default, detailed)
    #[arg(long, conflicts_with = "template_file")]
    pub template: Option<String>,

    /// Read the prompt template from a file
    #[arg(long, value_name = "PATH")]
    pub template_file: Option<PathBuf>,

    /// Link an open issue without asking (repeatable)
    #[arg(long = "issue", value_name = "NUMBER")]
    pub issues: Vec<u64>,

    /// Assign the pull request to this login
    #[arg(long)]
    pub assignee: Option<String>,

    /// Generate the draft but never publish it
    #[arg(long)]
    pub dry_run: bool,

    /// Publish without asking
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Merge right after publishing
    #[arg(long)]
    pub merge: bool,

    /// Merge strategy (squash, merge, rebase)
    #[arg(long, value_name = "METHOD")]
    pub merge_method: Option<MergeMethod>,

    /// Edit the description in $EDITOR before publishing
    #[arg(long)]
    pub edit: bool,

    /// Target repository (owner/repo); defaults to the origin remote
    #[arg(long)]
    pub repo: Option<String>,
}

/// Issue commands.
#[derive(Subcommand)]
pub enum IssueCommand {
    /// List open issues
    List {
        /// Target repository (owner/repo)
        #[arg(long)]
        repo: Option<String>,

        /// Maximum number of issues (first page only)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        limit: Option<u8>,
    },

    /// Create an issue
    Create {
        /// Target repository (owner/repo)
        #[arg(long)]
        repo: Option<String>,

        /// Issue title (asked for when omitted)
        #[arg(long)]
        title: Option<String>,

        /// Issue body (asked for when omitted)
        #[arg(long)]
        body: Option<String>,

        /// Label to apply (repeatable)
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Login to assign (repeatable)
        #[arg(long = "assignee", value_name = "LOGIN")]
        assignees: Vec<String>,

        /// Preview without creating the issue
        #[arg(long)]
        dry_run: bool,
    },
}

/// Label commands.
#[derive(Subcommand)]
pub enum LabelCommand {
    /// Create a label, or update it when it already exists
    Upsert {
        /// Label name
        name: String,

        /// Color as six hex digits (e.g. d73a4a or #d73a4a)
        #[arg(long)]
        color: Option<String>,

        /// Label description
        #[arg(long)]
        description: Option<String>,

        /// Target repository (owner/repo)
        #[arg(long)]
        repo: Option<String>,
    },

    /// Attach labels to an issue or pull request
    Add {
        /// Issue or PR reference (URL, owner/repo#number, or number)
        reference: String,

        /// Labels to attach
        #[arg(required = true)]
        labels: Vec<String>,

        /// Target repository (owner/repo) for bare numbers
        #[arg(long)]
        repo: Option<String>,
    },
}

/// Authentication commands.
#[derive(Subcommand)]
pub enum AuthCommand {
    /// Show where the GitHub token comes from
    Status,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pr_draft_flags() {
        let cli = Cli::try_parse_from([
            "prbuddy",
            "pr",
            "draft",
            "--from",
            "feature/login",
            "--to",
            "main",
            "--issue",
            "12",
            "--issue",
            "40",
            "--merge-method",
            "rebase",
            "-y",
        ])
        .unwrap();

        let Commands::Pr(PrCommand::Draft(args)) = cli.command else {
            panic!("expected pr draft");
        };
        assert_eq!(args.from.as_deref(), Some("feature/login"));
        assert_eq!(args.to.as_deref(), Some("main"));
        assert_eq!(args.issues, vec![12, 40]);
        assert_eq!(args.merge_method, Some(MergeMethod::Rebase));
        assert!(args.yes);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_template_and_template_file_conflict() {
        let result = Cli::try_parse_from([
            "prbuddy",
            "pr",
            "draft",
            "--template",
            "detailed",
            "--template-file",
            "t.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_label_add_requires_labels() {
        assert!(Cli::try_parse_from(["prbuddy", "label", "add", "12"]).is_err());
        assert!(Cli::try_parse_from(["prbuddy", "label", "add", "12", "bug"]).is_ok());
    }

    #[test]
    fn test_global_output_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["prbuddy", "issue", "list", "-o", "json"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }
}
