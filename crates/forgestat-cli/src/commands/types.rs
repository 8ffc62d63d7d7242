// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers and consumed by `output`.

use forgestat_core::{
    ActivityView, CommitSummary, DataOrigin, RepoEntry, RepoSort, RepoView,
};
use serde::Serialize;

/// Result from the `repos` command.
#[derive(Serialize)]
pub struct ReposResult {
    /// Sort key applied to the list.
    pub sort: RepoSort,
    /// Repository rows.
    pub repos: Vec<RepoView>,
}

/// Result from the `activity` command.
#[derive(Serialize)]
pub struct ActivityResult {
    /// Whether the feed is live or a substitute.
    pub origin: DataOrigin,
    /// Activity rows.
    pub events: Vec<ActivityView>,
}

/// Result from `browse commits`.
#[derive(Serialize)]
pub struct CommitsResult {
    /// Repository name.
    pub repo: String,
    /// Page number.
    pub page: u32,
    /// Commits on the page.
    pub commits: Vec<CommitSummary>,
}

/// Result from `browse files`.
#[derive(Serialize)]
pub struct FilesResult {
    /// Repository name.
    pub repo: String,
    /// Directory path.
    pub path: String,
    /// Directory entries.
    pub entries: Vec<RepoEntry>,
}

/// Result from `browse file`.
#[derive(Serialize)]
pub struct FileResult {
    /// Repository name.
    pub repo: String,
    /// File path.
    pub path: String,
    /// Decoded content.
    pub content: String,
}
