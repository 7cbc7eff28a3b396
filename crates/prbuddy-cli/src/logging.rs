// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the prbuddy CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging on stderr,
//! so stdout stays clean for rendered results.
//!
//! # Examples
//!
//! ```bash
//! # Default: warnings only
//! prbuddy pr draft
//!
//! # Debug output for troubleshooting
//! prbuddy -v pr draft
//!
//! # Full control
//! RUST_LOG=prbuddy_core=trace,octocrab=debug prbuddy pr draft
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::OutputFormat;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(format: OutputFormat, verbose: bool) -> &'static str {
    let structured = matches!(
        format,
        OutputFormat::Json | OutputFormat::Yaml | OutputFormat::Markdown
    );

    if verbose && !structured {
        "prbuddy=debug,prbuddy_core=debug,octocrab=warn,reqwest=warn"
    } else {
        "prbuddy=warn,prbuddy_core=warn,octocrab=error,reqwest=error"
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` wins when set. Otherwise `-v` enables debug logs for prbuddy,
/// except with structured output formats, which stay quiet.
pub fn init_logging(format: OutputFormat, verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(format, verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
