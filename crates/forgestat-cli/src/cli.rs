// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for forgestat.
//!
//! Uses clap's derive API. Connection flags are global so they can follow
//! any subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use forgestat_core::{ProviderKind, RepoSort};

/// Output format for CLI results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Show degradation details and skipped items
    pub verbose: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }
}

/// forgestat - aggregated statistics for a GitHub or GitLab user.
///
/// Loads profile, repositories, activity, languages, commit counts and the
/// monthly contribution calendar in one pass.
#[derive(Parser)]
#[command(name = "forgestat")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Enable verbose output (debug-level logging, degradation details)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Provider to query (github, gitlab)
    #[arg(long, short = 'p', global = true)]
    pub provider: Option<ProviderKind>,

    /// Username whose statistics are loaded
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    /// API base URL (self-hosted instances)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Fail when the profile is unavailable or placeholder data would be used
    #[arg(long, global = true)]
    pub strict: bool,

    /// Configuration file (defaults to the XDG config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load everything and print an overview
    Summary,

    /// Show the user profile
    Profile,

    /// List repositories
    Repos {
        /// Sort key (recency, stars, forks)
        #[arg(long, short = 's')]
        sort: Option<RepoSort>,
    },

    /// Show recent activity
    Activity,

    /// Show the language breakdown across repositories
    Languages,

    /// Show sampled commit counts per repository
    Commits,

    /// Show monthly contributions for a calendar year
    Contributions {
        /// Calendar year (defaults to the current year)
        #[arg(long, short = 'y')]
        year: Option<i32>,
    },

    /// Show chart-ready series for languages, commits and contributions
    Charts,

    /// Browse a repository
    #[command(subcommand)]
    Browse(BrowseCommand),
}

/// Repository browsing subcommands
#[derive(Subcommand)]
pub enum BrowseCommand {
    /// List commits, newest first
    Commits {
        /// Repository name
        repo: String,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Commits per page
        #[arg(long, default_value_t = 30)]
        per_page: u32,
    },

    /// Show one commit with its changed files
    Commit {
        /// Repository name
        repo: String,

        /// Commit SHA
        sha: String,
    },

    /// List a directory
    Files {
        /// Repository name
        repo: String,

        /// Directory path (defaults to the root)
        #[arg(default_value = "")]
        path: String,
    },

    /// Print a file
    File {
        /// Repository name
        repo: String,

        /// File path
        path: String,
    },
}
