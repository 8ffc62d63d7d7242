// SPDX-License-Identifier: Apache-2.0

//! Aggregation facade.
//!
//! `ForgeStats` owns one provider adapter and the six entity slots. `load_all`
//! runs the fetch pipeline in two phases:
//!
//! 1. profile, repository list, activity feed and contribution calendar,
//!    concurrently;
//! 2. language tally and commit tally over the repository list, concurrently.
//!
//! Only the repository list is load-bearing. Everything else degrades to
//! data (skipped items, fallback origins) unless [`FailurePolicy::Strict`]
//! is selected.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::auth::TokenProvider;
use crate::config::{AppConfig, FailurePolicy, ProviderConfig};
use crate::error::ForgeError;
use crate::model::{
    ActivityEvent, CommitDetail, CommitSummary, CommitTally, ContributionCalendar, DataOrigin,
    ItemFailure, LanguageTally, Profile, RepoEntry, RepoSort, RepositoryRecord, Sourced,
};
use crate::provider::{ForgeProvider, create_provider};
use crate::render::{
    ActivityView, ChartData, ProfileView, RepoView, chart_data, render_activity, render_profile,
    render_repos,
};

/// Options for one `load_all` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Repository sort key.
    pub sort: RepoSort,
    /// Repositories requested.
    pub repo_page_size: u32,
    /// Activity events requested.
    pub activity_page_size: u32,
    /// Commits sampled per repository.
    pub commit_page_size: u32,
    /// Calendar year for the contribution calendar.
    pub year: i32,
    /// Phase-1 failure policy.
    pub failure_policy: FailurePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sort: RepoSort::Recency,
            repo_page_size: 100,
            activity_page_size: 10,
            commit_page_size: 100,
            year: Utc::now().year(),
            failure_policy: FailurePolicy::Resilient,
        }
    }
}

impl LoadOptions {
    /// Takes page sizes, sort key and policy from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sort: config.fetch.sort,
            repo_page_size: config.fetch.repo_page_size,
            activity_page_size: config.fetch.activity_page_size,
            commit_page_size: config.fetch.commit_page_size,
            failure_policy: config.aggregate.failure_policy,
            ..Self::default()
        }
    }
}

/// What degraded during the last `load_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Profile failure absorbed under the resilient policy.
    pub profile_error: Option<String>,
    /// Origin of the activity feed, if loaded.
    pub activity: Option<DataOrigin>,
    /// Origin of the contribution calendar, if loaded.
    pub contributions: Option<DataOrigin>,
    /// Repositories missing from the language tally.
    pub skipped_languages: Vec<ItemFailure>,
    /// Repositories counted as zero in the commit tally.
    pub skipped_commits: Vec<ItemFailure>,
}

impl LoadReport {
    /// Returns true if any value is substituted or incomplete.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.profile_error.is_some()
            || self.activity.as_ref().is_some_and(DataOrigin::is_fallback)
            || self
                .contributions
                .as_ref()
                .is_some_and(DataOrigin::is_fallback)
            || !self.skipped_languages.is_empty()
            || !self.skipped_commits.is_empty()
    }
}

/// Serializable view of everything loaded.
#[derive(Debug, Serialize)]
pub struct StatsSnapshot<'a> {
    /// Provider name.
    pub provider: &'static str,
    /// Username.
    pub identity: &'a str,
    /// Profile, if loaded.
    pub profile: Option<&'a Profile>,
    /// Sort key of the repository list.
    pub sort: RepoSort,
    /// Repository list.
    pub repositories: &'a [RepositoryRecord],
    /// Activity feed, if loaded.
    pub activity: Option<&'a Sourced<Vec<ActivityEvent>>>,
    /// Language tally.
    pub languages: &'a LanguageTally,
    /// Commit tally.
    pub commits: &'a CommitTally,
    /// Contribution calendar, if loaded.
    pub contributions: Option<&'a ContributionCalendar>,
    /// Degradation summary.
    pub report: LoadReport,
}

/// Aggregated statistics for one user on one provider.
pub struct ForgeStats {
    provider: Arc<dyn ForgeProvider>,
    options: LoadOptions,
    profile: Option<Profile>,
    profile_error: Option<String>,
    repositories: Vec<RepositoryRecord>,
    activity: Option<Sourced<Vec<ActivityEvent>>>,
    languages: LanguageTally,
    commits: CommitTally,
    contributions: Option<ContributionCalendar>,
}

impl ForgeStats {
    /// Wraps an existing provider adapter.
    #[must_use]
    pub fn new(provider: Arc<dyn ForgeProvider>, options: LoadOptions) -> Self {
        Self {
            provider,
            options,
            profile: None,
            profile_error: None,
            repositories: Vec::new(),
            activity: None,
            languages: LanguageTally::new(),
            commits: CommitTally::new(),
            contributions: None,
        }
    }

    /// Builds the adapter for `provider` using the HTTP and fetch settings of `config`.
    pub fn from_config(config: &AppConfig, provider: &ProviderConfig) -> crate::Result<Self> {
        let adapter = create_provider(provider, &config.http, config.fetch.concurrency)?;
        Ok(Self::new(adapter, LoadOptions::from_config(config)))
    }

    /// Builds the adapter from the `[provider]` section, taking the credential
    /// from `tokens`.
    ///
    /// # Errors
    ///
    /// Fails with [`ForgeError::Configuration`] when no username is configured.
    pub fn connect(config: &AppConfig, tokens: &dyn TokenProvider) -> crate::Result<Self> {
        let section = &config.provider;
        let provider = ProviderConfig::builder()
            .kind(section.kind)
            .identity(section.username.clone().unwrap_or_default())
            .maybe_credential(tokens.forge_token(section.kind))
            .maybe_endpoint_base(section.base_url.clone())
            .build()?;
        Self::from_config(config, &provider)
    }

    /// Options used by `load_all`.
    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Mutable options, e.g. to change the year between loads.
    pub fn options_mut(&mut self) -> &mut LoadOptions {
        &mut self.options
    }

    /// The provider adapter.
    #[must_use]
    pub fn provider(&self) -> &dyn ForgeProvider {
        self.provider.as_ref()
    }

    /// Runs both fetch phases and replaces every slot.
    ///
    /// # Errors
    ///
    /// Fails if the repository list cannot be loaded; the tallies are then
    /// left empty. Under [`FailurePolicy::Strict`] a profile failure or any
    /// fallback substitution also fails the load.
    #[instrument(skip(self), fields(provider = %self.provider.kind(), identity = %self.provider.identity()))]
    pub async fn load_all(&mut self) -> crate::Result<()> {
        let provider = Arc::clone(&self.provider);
        let opts = self.options.clone();

        let (profile, repos, activity, contributions) = tokio::join!(
            provider.load_profile(),
            provider.load_repositories(opts.sort, opts.repo_page_size),
            provider.load_activity(opts.activity_page_size),
            provider.load_contributions(opts.year),
        );

        self.languages = LanguageTally::new();
        self.commits = CommitTally::new();

        let profile_failure = match profile {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_error = None;
                None
            }
            Err(e) => {
                self.profile = None;
                self.profile_error = Some(e.to_string());
                Some(e)
            }
        };
        let activity_fallback = fallback_reason(&activity.origin).map(str::to_string);
        let calendar_fallback = fallback_reason(contributions.origin()).map(str::to_string);
        self.activity = Some(activity);
        self.contributions = Some(contributions);

        self.repositories = match repos {
            Ok(repos) => repos,
            Err(e) => {
                self.repositories = Vec::new();
                return Err(e);
            }
        };

        if opts.failure_policy == FailurePolicy::Strict {
            if let Some(e) = profile_failure {
                return Err(e);
            }
            if let Some(reason) = activity_fallback {
                return Err(self.strict_error("load_activity", reason));
            }
            if let Some(reason) = calendar_fallback {
                return Err(self.strict_error("load_contributions", reason));
            }
        } else if let Some(e) = profile_failure {
            warn!(
                provider = %self.provider.kind(),
                operation = "load_profile",
                error = %e,
                "Profile unavailable, continuing without it"
            );
        }

        let (languages, commits) = tokio::join!(
            provider.load_languages(&self.repositories),
            provider.load_commit_tally(&self.repositories, opts.commit_page_size),
        );
        self.languages = languages;
        self.commits = commits;

        info!(
            repositories = self.repositories.len(),
            languages = self.languages.len(),
            degraded = self.load_report().is_degraded(),
            "Load complete"
        );
        Ok(())
    }

    /// Loads only the repository list, e.g. before browsing a repository.
    #[instrument(skip(self), fields(provider = %self.provider.kind(), identity = %self.provider.identity()))]
    pub async fn load_repositories(&mut self) -> crate::Result<()> {
        self.repositories = Vec::new();
        self.repositories = self
            .provider
            .load_repositories(self.options.sort, self.options.repo_page_size)
            .await?;
        Ok(())
    }

    fn strict_error(&self, operation: &str, reason: String) -> ForgeError {
        ForgeError::Upstream {
            provider: self.provider.kind().to_string(),
            operation: operation.to_string(),
            status: None,
            message: reason,
        }
    }

    /// Loaded profile.
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Loaded repository list, sorted by the configured key.
    #[must_use]
    pub fn repositories(&self) -> &[RepositoryRecord] {
        &self.repositories
    }

    /// Loaded activity feed.
    #[must_use]
    pub fn activity(&self) -> Option<&Sourced<Vec<ActivityEvent>>> {
        self.activity.as_ref()
    }

    /// Language tally.
    #[must_use]
    pub fn languages(&self) -> &LanguageTally {
        &self.languages
    }

    /// Commit tally.
    #[must_use]
    pub fn commits(&self) -> &CommitTally {
        &self.commits
    }

    /// Contribution calendar.
    #[must_use]
    pub fn contributions(&self) -> Option<&ContributionCalendar> {
        self.contributions.as_ref()
    }

    /// Degradation summary of the last load.
    #[must_use]
    pub fn load_report(&self) -> LoadReport {
        LoadReport {
            profile_error: self.profile_error.clone(),
            activity: self.activity.as_ref().map(|a| a.origin.clone()),
            contributions: self.contributions.as_ref().map(|c| c.origin().clone()),
            skipped_languages: self.languages.skipped().to_vec(),
            skipped_commits: self.commits.skipped().to_vec(),
        }
    }

    /// Everything loaded, for serialization.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot<'_> {
        StatsSnapshot {
            provider: self.provider.kind().as_str(),
            identity: self.provider.identity(),
            profile: self.profile(),
            sort: self.options.sort,
            repositories: self.repositories(),
            activity: self.activity(),
            languages: self.languages(),
            commits: self.commits(),
            contributions: self.contributions(),
            report: self.load_report(),
        }
    }

    /// Profile card.
    #[must_use]
    pub fn render_profile(&self) -> Option<ProfileView> {
        self.profile.as_ref().map(render_profile)
    }

    /// Repository rows ordered by `sort`.
    #[must_use]
    pub fn render_repos(&self, sort: RepoSort) -> Vec<RepoView> {
        render_repos(&self.repositories, sort)
    }

    /// Activity rows.
    #[must_use]
    pub fn render_activities(&self) -> Vec<ActivityView> {
        self.activity
            .as_ref()
            .map(|a| a.value.iter().map(render_activity).collect())
            .unwrap_or_default()
    }

    /// Chart projection. An unloaded calendar charts as twelve zero months.
    #[must_use]
    pub fn chart_data(&self) -> ChartData {
        let empty;
        let calendar = if let Some(calendar) = &self.contributions {
            calendar
        } else {
            empty = ContributionCalendar::new(self.options.year);
            &empty
        };
        chart_data(&self.languages, &self.commits, calendar)
    }

    fn find_repo(&self, name: &str, operation: &str) -> crate::Result<&RepositoryRecord> {
        self.repositories
            .iter()
            .find(|r| r.name == name || r.full_name == name)
            .ok_or_else(|| {
                ForgeError::upstream(
                    self.provider.kind().as_str(),
                    operation,
                    format!("repository '{name}' not found"),
                )
            })
    }

    /// Lists commits of a loaded repository.
    pub async fn load_repo_commits(
        &self,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> crate::Result<Vec<CommitSummary>> {
        let record = self.find_repo(repo, "load_repo_commits")?;
        self.provider
            .load_repo_commits(record, page.max(1), per_page)
            .await
    }

    /// Fetches one commit of a loaded repository.
    pub async fn load_commit_details(&self, repo: &str, sha: &str) -> crate::Result<CommitDetail> {
        let record = self.find_repo(repo, "load_commit_details")?;
        self.provider.load_commit_details(record, sha).await
    }

    /// Lists a directory of a loaded repository.
    pub async fn load_repo_files(&self, repo: &str, path: &str) -> crate::Result<Vec<RepoEntry>> {
        let record = self.find_repo(repo, "load_repo_files")?;
        self.provider.load_repo_files(record, path).await
    }

    /// Fetches a file of a loaded repository.
    pub async fn load_file_content(&self, repo: &str, path: &str) -> crate::Result<String> {
        let record = self.find_repo(repo, "load_file_content")?;
        self.provider.load_file_content(record, path).await
    }
}

fn fallback_reason(origin: &DataOrigin) -> Option<&str> {
    match origin {
        DataOrigin::Live => None,
        DataOrigin::Fallback { reason } => Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::config::ProviderKind;
    use crate::model::{ActivityDetails, ActivityKind, FALLBACK_MONTHLY_COUNTS};

    /// Provider with scripted results and failure injection.
    #[derive(Default)]
    struct MockProvider {
        repos: Vec<RepositoryRecord>,
        languages: BTreeMap<String, Vec<(String, f64)>>,
        fail_profile: bool,
        fail_repos: bool,
        fail_activity: bool,
        fail_calendar: bool,
        failing_repos: HashSet<String>,
        sub_fetches: AtomicUsize,
    }

    fn repo(name: &str, stars: u64, day: u32) -> RepositoryRecord {
        RepositoryRecord {
            id: u64::from(day),
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            description: None,
            primary_language: Some("Rust".to_string()),
            star_count: stars,
            fork_count: 0,
            last_updated: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            web_url: format!("https://github.com/octocat/{name}"),
            languages_endpoint: String::new(),
            size_hint: 0,
            default_branch: None,
        }
    }

    fn boom(operation: &str) -> ForgeError {
        ForgeError::Upstream {
            provider: "github".to_string(),
            operation: operation.to_string(),
            status: Some(500),
            message: "boom".to_string(),
        }
    }

    #[async_trait]
    impl ForgeProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::GitHub
        }

        fn identity(&self) -> &str {
            "octocat"
        }

        fn concurrency(&self) -> usize {
            3
        }

        async fn load_profile(&self) -> crate::Result<Profile> {
            if self.fail_profile {
                return Err(boom("load_profile"));
            }
            Ok(Profile {
                login: "octocat".to_string(),
                avatar_url: String::new(),
                display_name: "The Octocat".to_string(),
                bio: None,
                follower_count: 1,
                following_count: 0,
                public_repo_count: self.repos.len() as u64,
                location: None,
                profile_url: None,
            })
        }

        async fn load_repositories(
            &self,
            sort: RepoSort,
            _page_size: u32,
        ) -> crate::Result<Vec<RepositoryRecord>> {
            if self.fail_repos {
                return Err(boom("load_repositories"));
            }
            let mut repos = self.repos.clone();
            sort.sort(&mut repos);
            Ok(repos)
        }

        async fn fetch_activity(&self, _page_size: u32) -> crate::Result<Vec<ActivityEvent>> {
            if self.fail_activity {
                return Err(boom("load_activity"));
            }
            Ok(vec![ActivityEvent {
                kind: ActivityKind::Push,
                subject_repo: "octocat/alpha".to_string(),
                details: ActivityDetails::default(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            }])
        }

        async fn fetch_repo_languages(
            &self,
            repo: &RepositoryRecord,
        ) -> crate::Result<Vec<(String, f64)>> {
            self.sub_fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing_repos.contains(&repo.name) {
                return Err(boom("load_languages"));
            }
            Ok(self.languages.get(&repo.name).cloned().unwrap_or_default())
        }

        async fn count_repo_commits(
            &self,
            repo: &RepositoryRecord,
            _page_size: u32,
        ) -> crate::Result<u64> {
            self.sub_fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing_repos.contains(&repo.name) {
                return Err(boom("load_commit_tally"));
            }
            Ok(repo.star_count + 1)
        }

        async fn fetch_contributions(&self, year: i32) -> crate::Result<ContributionCalendar> {
            if self.fail_calendar {
                return Err(boom("load_contributions"));
            }
            let mut calendar = ContributionCalendar::new(year);
            if let Some(day) = chrono::NaiveDate::from_ymd_opt(year, 2, 10) {
                calendar.record(day, 4);
            }
            Ok(calendar)
        }

        async fn load_repo_commits(
            &self,
            repo: &RepositoryRecord,
            page: u32,
            _per_page: u32,
        ) -> crate::Result<Vec<CommitSummary>> {
            Ok(vec![CommitSummary {
                sha: format!("{}-{page}", repo.name),
                message: "Initial commit".to_string(),
                author: "Octocat".to_string(),
                date: None,
                url: None,
            }])
        }

        async fn load_commit_details(
            &self,
            _repo: &RepositoryRecord,
            sha: &str,
        ) -> crate::Result<CommitDetail> {
            Err(boom(&format!("load_commit_details {sha}")))
        }

        async fn load_repo_files(
            &self,
            _repo: &RepositoryRecord,
            _path: &str,
        ) -> crate::Result<Vec<RepoEntry>> {
            Ok(Vec::new())
        }

        async fn load_file_content(
            &self,
            repo: &RepositoryRecord,
            path: &str,
        ) -> crate::Result<String> {
            Ok(format!("{}:{path}", repo.name))
        }
    }

    fn langs(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(l, s)| ((*l).to_string(), *s)).collect()
    }

    fn mock() -> MockProvider {
        let mut languages = BTreeMap::new();
        languages.insert("alpha".to_string(), langs(&[("Rust", 1000.0), ("Shell", 50.0)]));
        languages.insert("beta".to_string(), langs(&[("Rust", 500.0), ("Go", 200.0)]));
        languages.insert("gamma".to_string(), langs(&[("Python", 300.0)]));
        MockProvider {
            repos: vec![repo("alpha", 5, 3), repo("beta", 9, 1), repo("gamma", 1, 2)],
            languages,
            ..MockProvider::default()
        }
    }

    fn stats(provider: MockProvider, policy: FailurePolicy) -> ForgeStats {
        ForgeStats::new(
            Arc::new(provider),
            LoadOptions {
                year: 2024,
                failure_policy: policy,
                ..LoadOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn load_all_populates_every_slot() {
        let mut stats = stats(mock(), FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        assert_eq!(stats.profile().unwrap().display_name, "The Octocat");
        assert_eq!(stats.repositories().len(), 3);
        assert!(RepoSort::Recency.is_sorted(stats.repositories()));
        assert_eq!(stats.languages().get("Rust"), Some(1500.0));
        assert_eq!(stats.commits().len(), 3);
        assert_eq!(stats.contributions().unwrap().get("Feb"), Some(4));
        assert!(!stats.load_report().is_degraded());
    }

    #[tokio::test]
    async fn commit_keys_equal_repo_names_in_order() {
        let mut provider = mock();
        provider.failing_repos.insert("beta".to_string());
        let mut stats = stats(provider, FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        let names: Vec<_> = stats.repositories().iter().map(|r| r.name.as_str()).collect();
        let keys: Vec<_> = stats.commits().names().collect();
        assert_eq!(keys, names);
        assert_eq!(stats.commits().get("beta"), Some(0));
        assert_eq!(stats.commits().get("alpha"), Some(6));
    }

    #[tokio::test]
    async fn failing_language_fetch_is_isolated() {
        let mut provider = mock();
        provider.failing_repos.insert("gamma".to_string());
        let mut stats = stats(provider, FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        assert_eq!(stats.languages().get("Rust"), Some(1500.0));
        assert_eq!(stats.languages().get("Go"), Some(200.0));
        assert_eq!(stats.languages().get("Python"), None);
        let report = stats.load_report();
        assert_eq!(report.skipped_languages.len(), 1);
        assert_eq!(report.skipped_languages[0].item, "gamma");
        assert!(report.is_degraded());
    }

    #[tokio::test]
    async fn language_tally_is_order_independent() {
        let orders = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];
        let mut tallies = Vec::new();
        for order in orders {
            let base = mock();
            let repos: Vec<_> = order.iter().map(|i| base.repos[*i].clone()).collect();
            let provider = MockProvider { repos, ..mock() };
            tallies.push(provider.load_languages(&provider.repos).await);
        }
        for tally in &tallies[1..] {
            for (language, size) in tallies[0].iter() {
                let other = tally.get(language).unwrap();
                assert!((other - size).abs() < 1e-9);
            }
            assert_eq!(tally.len(), tallies[0].len());
        }
    }

    #[tokio::test]
    async fn repo_failure_aborts_before_phase_two() {
        let provider = Arc::new(MockProvider {
            fail_repos: true,
            ..mock()
        });
        let mut stats = ForgeStats::new(provider.clone(), LoadOptions::default());
        let err = stats.load_all().await.unwrap_err();

        assert!(err.is_upstream());
        assert!(stats.repositories().is_empty());
        assert!(stats.languages().is_empty());
        assert!(stats.commits().is_empty());
        assert_eq!(provider.sub_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resilient_absorbs_profile_and_fallbacks() {
        let provider = MockProvider {
            fail_profile: true,
            fail_activity: true,
            fail_calendar: true,
            ..mock()
        };
        let mut stats = stats(provider, FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        assert!(stats.profile().is_none());
        assert!(stats.render_profile().is_none());
        let activity = stats.activity().unwrap();
        assert!(activity.is_fallback());
        assert!(activity.value.is_empty());

        let calendar = stats.contributions().unwrap();
        assert!(calendar.is_fallback());
        let counts: Vec<_> = calendar.iter().map(|(_, c)| c).collect();
        assert_eq!(counts, FALLBACK_MONTHLY_COUNTS.to_vec());

        let report = stats.load_report();
        assert!(report.profile_error.is_some());
        assert_eq!(stats.commits().len(), 3);
    }

    #[tokio::test]
    async fn strict_escalates_profile_failure() {
        let provider = MockProvider {
            fail_profile: true,
            ..mock()
        };
        let mut stats = stats(provider, FailurePolicy::Strict);
        let err = stats.load_all().await.unwrap_err();
        assert!(matches!(err, ForgeError::Upstream { ref operation, .. } if operation == "load_profile"));
    }

    #[tokio::test]
    async fn strict_escalates_calendar_fallback() {
        let provider = MockProvider {
            fail_calendar: true,
            ..mock()
        };
        let mut stats = stats(provider, FailurePolicy::Strict);
        let err = stats.load_all().await.unwrap_err();
        assert!(
            matches!(err, ForgeError::Upstream { ref operation, .. } if operation == "load_contributions")
        );
    }

    #[tokio::test]
    async fn calendar_always_has_twelve_months() {
        for fail in [false, true] {
            let provider = MockProvider {
                fail_calendar: fail,
                ..mock()
            };
            let mut stats = stats(provider, FailurePolicy::Resilient);
            stats.load_all().await.unwrap();
            assert_eq!(stats.contributions().unwrap().len(), 12);
            assert_eq!(stats.chart_data().contributions.len(), 12);
        }
    }

    #[tokio::test]
    async fn render_repos_respects_sort() {
        let mut stats = stats(mock(), FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        let by_stars = stats.render_repos(RepoSort::Stars);
        let stars: Vec<_> = by_stars.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![9, 5, 1]);
        assert_eq!(by_stars[0].description, "No description");
        assert_eq!(stats.render_activities().len(), 1);
    }

    struct StaticTokens(Option<&'static str>);

    impl TokenProvider for StaticTokens {
        fn forge_token(&self, _kind: ProviderKind) -> Option<secrecy::SecretString> {
            self.0.map(|t| secrecy::SecretString::from(t.to_string()))
        }
    }

    #[test]
    fn connect_requires_username() {
        let config = AppConfig::default();
        let err = ForgeStats::connect(&config, &StaticTokens(Some("token")))
            .err()
            .unwrap();
        assert!(matches!(err, ForgeError::Configuration { .. }));
    }

    #[test]
    fn connect_uses_provider_section() {
        let mut config = AppConfig::default();
        config.provider.kind = ProviderKind::GitLab;
        config.provider.username = Some("gitlab-user".to_string());
        config.fetch.concurrency = 2;
        config.aggregate.failure_policy = FailurePolicy::Strict;

        let stats = ForgeStats::connect(&config, &StaticTokens(None)).unwrap();
        assert_eq!(stats.provider().kind(), ProviderKind::GitLab);
        assert_eq!(stats.provider().identity(), "gitlab-user");
        assert_eq!(stats.provider().concurrency(), 2);
        assert_eq!(stats.options().failure_policy, FailurePolicy::Strict);
    }

    #[tokio::test]
    async fn load_repositories_alone_enables_browsing() {
        let mut stats = stats(mock(), FailurePolicy::Resilient);
        stats.load_repositories().await.unwrap();
        assert_eq!(stats.repositories().len(), 3);
        assert!(stats.languages().is_empty());

        let content = stats.load_file_content("gamma", "a.txt").await.unwrap();
        assert_eq!(content, "gamma:a.txt");
    }

    #[tokio::test]
    async fn chart_data_before_load() {
        let stats = stats(mock(), FailurePolicy::Resilient);
        let charts = stats.chart_data();
        assert!(charts.languages.is_empty());
        assert!(charts.commits.is_empty());
        assert_eq!(charts.contributions.values, vec![0; 12]);
    }

    #[tokio::test]
    async fn browse_looks_up_loaded_repositories() {
        let mut stats = stats(mock(), FailurePolicy::Resilient);
        stats.load_all().await.unwrap();

        let content = stats.load_file_content("alpha", "README.md").await.unwrap();
        assert_eq!(content, "alpha:README.md");

        let commits = stats.load_repo_commits("octocat/beta", 0, 10).await.unwrap();
        assert_eq!(commits[0].sha, "beta-1");

        let err = stats.load_repo_files("missing", "").await.unwrap_err();
        assert!(err.to_string().contains("repository 'missing' not found"));
    }
}
