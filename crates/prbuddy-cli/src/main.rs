// SPDX-License-Identifier: Apache-2.0

//! prbuddy - AI-drafted pull requests and GitHub workflow helpers.
//!
//! Compares two branches, lets you link open issues, has Gemini write the
//! title and description, and opens (and optionally merges) the pull request.

mod cli;
mod commands;
mod editor;
mod errors;
mod logging;
mod output;
mod provider;
mod select;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use prbuddy_core::config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

/// Loads configuration, applies global overrides, and runs the command.
async fn run(cli: Cli, output_ctx: OutputContext) -> anyhow::Result<()> {
    let mut config = config::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    if !config.ui.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if let Some(model) = &cli.model {
        config.ai.model.clone_from(model);
        debug!("Overriding Gemini model to: {model}");
    }

    commands::run(cli.command, output_ctx, &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.output, cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    match run(cli, output_ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            ExitCode::FAILURE
        }
    }
}
