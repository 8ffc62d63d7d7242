// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Forgestat Core
//!
//! Core library for forgestat - aggregated statistics for a single GitHub or
//! GitLab user.
//!
//! This crate provides reusable components for:
//! - Provider adapters over the GitHub REST/GraphQL and GitLab REST APIs
//! - Concurrent, failure-isolated aggregation of languages and commit counts
//! - Monthly contribution calendars with placeholder fallback
//! - Display projections for profile, repositories, activity and charts
//! - Repository browsing (commits, commit details, files)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forgestat_core::{ForgeStats, ProviderConfig, ProviderKind, load_config};
//! use anyhow::Result;
//!
//! # async fn example() -> Result<()> {
//! let config = load_config()?;
//! let provider = ProviderConfig::builder()
//!     .kind(ProviderKind::GitHub)
//!     .identity("octocat")
//!     .build()?;
//!
//! let mut stats = ForgeStats::from_config(&config, &provider)?;
//! stats.load_all().await?;
//!
//! for (language, bytes) in stats.languages().iter() {
//!     println!("{language}: {bytes}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and provider settings
//! - [`error`] - Error types
//! - [`facade`] - The aggregation facade
//! - [`model`] - Provider-agnostic entities
//! - [`provider`] - GitHub and GitLab adapters
//! - [`render`] - Display projections

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{TokenProvider, build_headers};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::ForgeError;

/// Convenience Result type for forgestat operations.
///
/// This is equivalent to `std::result::Result<T, ForgeError>`.
pub type Result<T> = std::result::Result<T, ForgeError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AggregateConfig, AppConfig, FailurePolicy, FetchConfig, HttpConfig, ProviderConfig,
    ProviderKind, ProviderSection, config_dir, config_file_path, load_config, load_config_from,
};

// ============================================================================
// Entities
// ============================================================================

pub use model::{
    ActivityDetails, ActivityEvent, ActivityKind, ChangedFile, CommitDetail, CommitStats,
    CommitSummary, CommitTally, ContributionCalendar, DataOrigin, EntryKind, ItemFailure,
    LanguageTally, MONTH_LABELS, Profile, RepoEntry, RepoSort, RepositoryRecord, Sourced,
};

// ============================================================================
// Providers
// ============================================================================

pub use provider::{ForgeProvider, GitHubProvider, GitLabProvider, create_provider};

// ============================================================================
// Aggregation Facade
// ============================================================================

pub use facade::{ForgeStats, LoadOptions, LoadReport, StatsSnapshot};

// ============================================================================
// Rendering
// ============================================================================

pub use render::{ActivityView, ChartData, ChartSeries, ProfileView, RepoView};

// ============================================================================
// Utilities
// ============================================================================

pub use formatters::{
    format_commit_message, format_date, format_date_time, format_file_size, format_number,
    format_optional_number, format_relative_time, parse_and_format_relative_time, truncate,
    truncate_with_suffix,
};

// ============================================================================
// Modules
// ============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod fanout;
pub mod formatters;
pub mod model;
pub mod provider;
pub mod render;
