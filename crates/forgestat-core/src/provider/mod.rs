// SPDX-License-Identifier: Apache-2.0

//! Provider adapter contract.
//!
//! Defines the `ForgeProvider` trait that the GitHub and GitLab adapters
//! implement. Adapters supply the raising primitives (one upstream call per
//! method); the trait's default methods apply the shared policies on top:
//! per-repository isolation for the tallies and fallback substitution for
//! the activity feed and the contribution calendar.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::{HttpConfig, ProviderConfig, ProviderKind};
use crate::fanout::{ItemOutcome, fan_out};
use crate::model::{
    ActivityEvent, CommitDetail, CommitSummary, CommitTally, ContributionCalendar, ItemFailure,
    LanguageTally, Profile, RepoEntry, RepoSort, RepositoryRecord, Sourced,
};

pub mod github;
pub mod gitlab;
pub(crate) mod http;

pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

/// Common contract over a source-control hosting provider.
///
/// All methods are scoped to the identity the provider was built for.
#[async_trait]
pub trait ForgeProvider: Send + Sync {
    /// Provider kind.
    fn kind(&self) -> ProviderKind;

    /// Username whose data is fetched.
    fn identity(&self) -> &str;

    /// Maximum concurrent per-repository sub-fetches.
    fn concurrency(&self) -> usize;

    /// Fetches the user profile.
    async fn load_profile(&self) -> crate::Result<Profile>;

    /// Fetches one page of repositories.
    ///
    /// The list is sorted locally (stable, descending) by `sort` before it is
    /// returned, whatever order the upstream used.
    async fn load_repositories(
        &self,
        sort: RepoSort,
        page_size: u32,
    ) -> crate::Result<Vec<RepositoryRecord>>;

    /// Fetches one page of recent events.
    async fn fetch_activity(&self, page_size: u32) -> crate::Result<Vec<ActivityEvent>>;

    /// Fetches the language breakdown of one repository as `(language, size)`.
    async fn fetch_repo_languages(
        &self,
        repo: &RepositoryRecord,
    ) -> crate::Result<Vec<(String, f64)>>;

    /// Counts the commits on one page of a repository's history.
    async fn count_repo_commits(&self, repo: &RepositoryRecord, page_size: u32)
    -> crate::Result<u64>;

    /// Fetches the monthly contribution counts for `year`.
    async fn fetch_contributions(&self, year: i32) -> crate::Result<ContributionCalendar>;

    /// Lists commits of a repository, newest first.
    async fn load_repo_commits(
        &self,
        repo: &RepositoryRecord,
        page: u32,
        per_page: u32,
    ) -> crate::Result<Vec<CommitSummary>>;

    /// Fetches a single commit with statistics and changed files.
    async fn load_commit_details(
        &self,
        repo: &RepositoryRecord,
        sha: &str,
    ) -> crate::Result<CommitDetail>;

    /// Lists the entries of a directory (empty path for the root).
    async fn load_repo_files(
        &self,
        repo: &RepositoryRecord,
        path: &str,
    ) -> crate::Result<Vec<RepoEntry>>;

    /// Fetches the decoded content of a file.
    async fn load_file_content(&self, repo: &RepositoryRecord, path: &str)
    -> crate::Result<String>;

    /// Loads the activity feed, substituting an empty list on failure.
    #[instrument(skip(self), fields(provider = %self.kind()))]
    async fn load_activity(&self, page_size: u32) -> Sourced<Vec<ActivityEvent>> {
        match self.fetch_activity(page_size).await {
            Ok(events) => {
                debug!(count = events.len(), "Loaded activity");
                Sourced::live(events)
            }
            Err(e) => {
                warn!(
                    provider = %self.kind(),
                    operation = "load_activity",
                    fallback = true,
                    error = %e,
                    "Activity unavailable, using empty feed"
                );
                Sourced::fallback(Vec::new(), e.to_string())
            }
        }
    }

    /// Sums language sizes across repositories.
    ///
    /// A repository whose breakdown fails is recorded as skipped and does not
    /// affect the others.
    #[instrument(skip(self, repos), fields(provider = %self.kind(), repos = repos.len()))]
    async fn load_languages(&self, repos: &[RepositoryRecord]) -> LanguageTally {
        let items = repos.iter().map(|repo| (repo.name.clone(), repo)).collect();
        let result = fan_out(items, self.concurrency(), |repo| {
            self.fetch_repo_languages(repo)
        })
        .await;

        let mut tally = LanguageTally::new();
        for (name, outcome) in result.outcomes {
            match outcome {
                ItemOutcome::Success(entries) => {
                    for (language, size) in entries {
                        tally.add(&language, size);
                    }
                }
                ItemOutcome::Failed(reason) => {
                    warn!(
                        provider = %self.kind(),
                        repo = %name,
                        fallback = true,
                        error = %reason,
                        "Skipping language breakdown"
                    );
                    tally.record_failure(ItemFailure { item: name, reason });
                }
            }
        }

        debug!(languages = tally.len(), skipped = result.failed, "Loaded languages");
        tally
    }

    /// Samples commit counts per repository.
    ///
    /// Every repository appears in the result, in input order; failed
    /// sub-fetches count as 0.
    #[instrument(skip(self, repos), fields(provider = %self.kind(), repos = repos.len()))]
    async fn load_commit_tally(&self, repos: &[RepositoryRecord], page_size: u32) -> CommitTally {
        let items = repos.iter().map(|repo| (repo.name.clone(), repo)).collect();
        let result = fan_out(items, self.concurrency(), |repo| {
            self.count_repo_commits(repo, page_size)
        })
        .await;

        let mut tally = CommitTally::new();
        for (name, outcome) in result.outcomes {
            match outcome {
                ItemOutcome::Success(count) => tally.insert(&name, count),
                ItemOutcome::Failed(reason) => {
                    warn!(
                        provider = %self.kind(),
                        repo = %name,
                        fallback = true,
                        error = %reason,
                        "Counting commits failed, recording 0"
                    );
                    tally.record_failure(ItemFailure { item: name, reason });
                }
            }
        }

        debug!(repos = tally.len(), skipped = result.failed, "Loaded commit counts");
        tally
    }

    /// Loads the contribution calendar, substituting the placeholder calendar
    /// on failure.
    #[instrument(skip(self), fields(provider = %self.kind()))]
    async fn load_contributions(&self, year: i32) -> ContributionCalendar {
        match self.fetch_contributions(year).await {
            Ok(calendar) => {
                debug!(total = calendar.total(), "Loaded contributions");
                calendar
            }
            Err(e) => {
                warn!(
                    provider = %self.kind(),
                    operation = "load_contributions",
                    fallback = true,
                    error = %e,
                    "Contributions unavailable, using placeholder calendar"
                );
                ContributionCalendar::fallback(year, e.to_string())
            }
        }
    }
}

/// Creates the adapter for the configured provider kind.
pub fn create_provider(
    config: &ProviderConfig,
    http: &HttpConfig,
    concurrency: usize,
) -> crate::Result<Arc<dyn ForgeProvider>> {
    let provider: Arc<dyn ForgeProvider> = match config.kind() {
        ProviderKind::GitHub => Arc::new(GitHubProvider::new(config, http, concurrency)?),
        ProviderKind::GitLab => Arc::new(GitLabProvider::new(config, http, concurrency)?),
    };
    Ok(provider)
}

/// Characters escaped in a path segment (everything but unreserved).
pub(crate) const SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes each segment of a `/`-separated path, keeping the separators.
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encodes a whole path as a single segment (`/` becomes `%2F`).
pub(crate) fn encode_component(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, SEGMENT).to_string()
}
