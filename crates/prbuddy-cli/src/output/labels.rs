// SPDX-License-Identifier: Apache-2.0

use console::style;
use prbuddy_core::{LabelAction, LabelUpsert};
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::LabelsAddedResult;

use super::Renderable;

impl Renderable for LabelUpsert {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let verb = match self.action {
            LabelAction::Created => "Created",
            LabelAction::Updated => "Updated",
        };
        writeln!(
            w,
            "{} {verb} label {}",
            style("*").green().bold(),
            style(&self.name).yellow()
        )?;
        if let Some(color) = &self.color {
            writeln!(w, "  Color: #{color}")?;
        }
        if let Some(description) = &self.description {
            writeln!(w, "  Description: {description}")?;
        }
        Ok(())
    }
}

impl Renderable for LabelsAddedResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(
            w,
            "{} Labelled {}#{}: {}",
            style("*").green().bold(),
            self.repo,
            self.number,
            style(self.requested.join(", ")).yellow()
        )?;
        if !self.labels.is_empty() {
            writeln!(w, "  Now labelled: {}", self.labels.join(", "))?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "**{}#{}** labels: {}", self.repo, self.number, self.labels.join(", "))
    }
}
