// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the forgestat CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging on stderr,
//! so stdout stays clean for `--output json`. Log level can be controlled via
//! the `RUST_LOG` environment variable.
//!
//! # Examples
//!
//! ```bash
//! # Default: warnings only (fallbacks and skipped repositories)
//! forgestat summary -u octocat
//!
//! # Request URLs, counts and timings
//! RUST_LOG=forgestat_core=debug forgestat summary -u octocat
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "forgestat=debug,forgestat_core=debug,reqwest=warn"
    } else {
        "forgestat=warn,forgestat_core=warn,reqwest=error"
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence; otherwise `-v` raises the default level from
/// `warn` to `debug`.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
