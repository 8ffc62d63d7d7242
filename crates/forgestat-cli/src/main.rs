// SPDX-License-Identifier: Apache-2.0

//! forgestat - aggregated statistics for a GitHub or GitLab user.
//!
//! A CLI that loads a user's profile, repositories, activity, language
//! breakdown, commit counts and contribution calendar, and renders them as
//! text or JSON.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod provider;

pub use provider::CliTokenProvider;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.verbose);

    match commands::run(cli, output_ctx).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            std::process::exit(1);
        }
    }
}
