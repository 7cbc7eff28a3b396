// SPDX-License-Identifier: Apache-2.0

use console::style;
use prbuddy_core::{DraftOutcome, PullRequestDraft};
use std::io::{self, Write};

use crate::cli::OutputContext;

use super::Renderable;

/// Writes the draft the human is asked to publish.
pub fn write_draft_preview(w: &mut dyn Write, draft: &PullRequestDraft) -> io::Result<()> {
    writeln!(w)?;
    writeln!(
        w,
        "{} {} {} {}",
        style("Pull request").bold(),
        style(&draft.head).cyan(),
        style("->").dim(),
        style(&draft.base).cyan()
    )?;
    writeln!(w)?;
    writeln!(w, "{}", style("Title").bold())?;
    writeln!(w, "  {}", draft.title)?;
    writeln!(w)?;
    writeln!(w, "{}", style("Description").bold())?;
    for line in draft.description.lines() {
        writeln!(w, "  {line}")?;
    }
    writeln!(w)?;

    let labels = if draft.labels.is_empty() {
        style("none".to_string()).dim()
    } else {
        style(draft.labels.as_slice().join(", ")).yellow()
    };
    writeln!(w, "  {}  {labels}", style("labels:").dim())?;
    if let Some(assignee) = &draft.assignee {
        writeln!(w, "  {}  {}", style("assignee:").dim(), style(assignee).cyan())?;
    }
    writeln!(w)?;
    Ok(())
}

impl Renderable for DraftOutcome {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        match self {
            DraftOutcome::EarlyExit { source, target } => {
                writeln!(
                    w,
                    "{}",
                    style(format!(
                        "No changes between {target} and {source}; nothing to describe."
                    ))
                    .yellow()
                )?;
            }
            DraftOutcome::Skipped { dry_run: true, .. } => {
                writeln!(
                    w,
                    "{}",
                    style("DRY RUN - Pull request not created").yellow().bold()
                )?;
            }
            DraftOutcome::Skipped { dry_run: false, .. } => {
                writeln!(w, "{}", style("Pull request not created.").yellow())?;
            }
            DraftOutcome::Published { title, pr, merged } => {
                writeln!(w)?;
                writeln!(w, "{}", style("Pull Request Created").green().bold())?;
                writeln!(w, "  Title: {title}")?;
                writeln!(w, "  Number: {}", style(pr.number).cyan())?;
                writeln!(w, "  URL: {}", style(&pr.url).cyan().underlined())?;
                if let Some(method) = merged {
                    writeln!(
                        w,
                        "  {} Merged with {}",
                        style("*").green().bold(),
                        style(method).cyan()
                    )?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        match self {
            DraftOutcome::EarlyExit { source, target } => {
                writeln!(w, "No changes between `{target}` and `{source}`.")?;
            }
            DraftOutcome::Skipped { draft, .. } => {
                writeln!(w, "# {}\n", draft.title)?;
                writeln!(w, "{}", draft.description)?;
            }
            DraftOutcome::Published { title, pr, merged } => {
                writeln!(w, "## Pull Request Created\n")?;
                writeln!(w, "**Title:** {title}\n")?;
                writeln!(w, "**URL:** {}\n", pr.url)?;
                if let Some(method) = merged {
                    writeln!(w, "**Merged:** {method}")?;
                }
            }
        }
        Ok(())
    }
}
