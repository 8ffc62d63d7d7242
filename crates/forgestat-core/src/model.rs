// SPDX-License-Identifier: Apache-2.0

//! Provider-agnostic entities produced by the fetchers.
//!
//! Every entity is created by exactly one fetch and fully replaces the
//! previous value on the next load. Upstream wire shapes live next to each
//! provider; only normalized data crosses the [`crate::provider::ForgeProvider`]
//! boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// User profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Login (username) as reported by the provider.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Display name. Falls back to the login, never empty.
    pub display_name: String,
    /// Biography.
    pub bio: Option<String>,
    /// Number of followers.
    pub follower_count: u64,
    /// Number of followed users.
    pub following_count: u64,
    /// Number of public repositories.
    pub public_repo_count: u64,
    /// Free-form location.
    pub location: Option<String>,
    /// Web profile URL.
    pub profile_url: Option<String>,
}

impl Profile {
    /// Picks the display name: the upstream name when non-blank, else the login.
    #[must_use]
    pub fn display_name_or_login(name: Option<&str>, login: &str) -> String {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => login.to_string(),
        }
    }
}

/// Repository metadata shared by all downstream fetchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    /// Provider-side numeric identifier.
    pub id: u64,
    /// Short repository name.
    pub name: String,
    /// Namespaced name (`owner/name`).
    pub full_name: String,
    /// Description.
    pub description: Option<String>,
    /// Primary language, if the provider reports one.
    pub primary_language: Option<String>,
    /// Star count.
    pub star_count: u64,
    /// Fork count.
    pub fork_count: u64,
    /// Last update (GitHub `updated_at`, GitLab `last_activity_at`).
    pub last_updated: DateTime<Utc>,
    /// Browser URL.
    pub web_url: String,
    /// Endpoint returning the per-language breakdown.
    pub languages_endpoint: String,
    /// Repository size hint used to approximate bytes from percentages.
    pub size_hint: u64,
    /// Default branch, when the provider reports one.
    pub default_branch: Option<String>,
}

/// Sort key for the repository list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSort {
    /// Most recently updated first.
    #[default]
    #[serde(alias = "updated")]
    Recency,
    /// Most starred first.
    Stars,
    /// Most forked first.
    Forks,
}

impl RepoSort {
    /// All sort keys.
    pub const ALL: [RepoSort; 3] = [RepoSort::Recency, RepoSort::Stars, RepoSort::Forks];

    /// Sorts records descending by this key.
    ///
    /// The sort is stable, so records with equal keys keep the upstream order.
    pub fn sort(self, repos: &mut [RepositoryRecord]) {
        match self {
            RepoSort::Recency => repos.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
            RepoSort::Stars => repos.sort_by(|a, b| b.star_count.cmp(&a.star_count)),
            RepoSort::Forks => repos.sort_by(|a, b| b.fork_count.cmp(&a.fork_count)),
        }
    }

    /// Returns true if `repos` is ordered descending by this key.
    #[must_use]
    pub fn is_sorted(self, repos: &[RepositoryRecord]) -> bool {
        repos.windows(2).all(|w| match self {
            RepoSort::Recency => w[0].last_updated >= w[1].last_updated,
            RepoSort::Stars => w[0].star_count >= w[1].star_count,
            RepoSort::Forks => w[0].fork_count >= w[1].fork_count,
        })
    }

    /// Lowercase name used in configuration and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RepoSort::Recency => "recency",
            RepoSort::Stars => "stars",
            RepoSort::Forks => "forks",
        }
    }
}

impl fmt::Display for RepoSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recency" | "updated" => Ok(RepoSort::Recency),
            "stars" => Ok(RepoSort::Stars),
            "forks" => Ok(RepoSort::Forks),
            other => Err(format!(
                "Invalid sort key '{other}'. Expected one of: recency, stars, forks"
            )),
        }
    }
}

/// Normalized activity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Commits pushed.
    Push,
    /// Branch, tag or repository created.
    Create,
    /// Pull request (GitHub) or merge request (GitLab).
    PullRequest,
    /// Issue opened, closed, etc.
    Issue,
    /// Repository starred.
    Watch,
    /// Anything else, with the upstream type name.
    Other(String),
}

/// Extra event data used for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityDetails {
    /// Action verb (`opened`, `closed`, `pushed to`, ...).
    pub action: Option<String>,
    /// Target of the action (`branch`, `tag`, `MergeRequest`, ...).
    pub target: Option<String>,
}

/// One entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEvent {
    /// Normalized kind.
    pub kind: ActivityKind,
    /// Repository the event happened in.
    pub subject_repo: String,
    /// Payload details.
    pub details: ActivityDetails,
    /// Event time.
    pub timestamp: DateTime<Utc>,
}

/// A repository whose sub-fetch failed and was absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Repository name.
    pub item: String,
    /// Failure description.
    pub reason: String,
}

/// Whether a value came from the provider or was substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    /// Genuine upstream data.
    Live,
    /// Synthetic value substituted after a failure.
    Fallback {
        /// Failure that triggered the substitution.
        reason: String,
    },
}

impl DataOrigin {
    /// Returns true for substituted data.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, DataOrigin::Fallback { .. })
    }
}

/// A value tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    /// The value.
    pub value: T,
    /// Where it came from.
    pub origin: DataOrigin,
}

impl<T> Sourced<T> {
    /// Wraps genuine data.
    pub fn live(value: T) -> Self {
        Self {
            value,
            origin: DataOrigin::Live,
        }
    }

    /// Wraps substituted data.
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            origin: DataOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// Returns true for substituted data.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }
}

/// Accumulated size per language across repositories.
///
/// Values are bytes for providers that report byte counts. For providers
/// that report percentages, each repository contributes
/// `percentage * size_hint / 100`, which is an approximation and not an
/// exact byte count. Keys iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageTally {
    totals: BTreeMap<String, f64>,
    skipped: Vec<ItemFailure>,
}

impl LanguageTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `size` to `language`.
    ///
    /// Negative and non-finite sizes are ignored so totals never decrease.
    pub fn add(&mut self, language: &str, size: f64) {
        if !size.is_finite() || size < 0.0 {
            return;
        }
        *self.totals.entry(language.to_string()).or_insert(0.0) += size;
    }

    /// Records a repository whose breakdown could not be fetched.
    pub fn record_failure(&mut self, failure: ItemFailure) {
        self.skipped.push(failure);
    }

    /// Total for one language.
    #[must_use]
    pub fn get(&self, language: &str) -> Option<f64> {
        self.totals.get(language).copied()
    }

    /// Number of distinct languages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns true if no language has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterates `(language, size)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum over all languages.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Repositories omitted because their breakdown failed.
    #[must_use]
    pub fn skipped(&self) -> &[ItemFailure] {
        &self.skipped
    }
}

/// Commit counts per repository, sampled from a single page.
///
/// A count is bounded by the page size used to fetch it; it is not a total.
/// Keys keep the order of the repository list the tally was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitTally {
    #[serde(rename = "counts", serialize_with = "serialize_ordered")]
    entries: Vec<(String, u64)>,
    skipped: Vec<ItemFailure>,
}

impl CommitTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count for a repository, replacing any previous value.
    pub fn insert(&mut self, repo: &str, count: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == repo) {
            entry.1 = count;
        } else {
            self.entries.push((repo.to_string(), count));
        }
    }

    /// Records a zero count for a repository whose sub-fetch failed.
    pub fn record_failure(&mut self, failure: ItemFailure) {
        self.insert(&failure.item, 0);
        self.skipped.push(failure);
    }

    /// Count for one repository.
    #[must_use]
    pub fn get(&self, repo: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == repo)
            .map(|(_, count)| *count)
    }

    /// Number of repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no repository has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(repo, count)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Repository names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Repositories whose sub-fetch failed and were counted as zero.
    #[must_use]
    pub fn skipped(&self) -> &[ItemFailure] {
        &self.skipped
    }
}

fn serialize_ordered<S: Serializer>(entries: &[(String, u64)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

/// Month labels, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Placeholder counts substituted when the calendar cannot be fetched.
pub const FALLBACK_MONTHLY_COUNTS: [u64; 12] = [12, 19, 8, 15, 22, 30, 18, 14, 25, 20, 17, 10];

/// Monthly contribution counts for one calendar year.
///
/// Always holds exactly twelve buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionCalendar {
    year: i32,
    #[serde(rename = "months", serialize_with = "serialize_months")]
    counts: [u64; 12],
    origin: DataOrigin,
}

impl ContributionCalendar {
    /// Creates an all-zero calendar for `year`.
    #[must_use]
    pub fn new(year: i32) -> Self {
        Self {
            year,
            counts: [0; 12],
            origin: DataOrigin::Live,
        }
    }

    /// The fixed placeholder calendar, tagged as fallback data.
    #[must_use]
    pub fn fallback(year: i32, reason: impl Into<String>) -> Self {
        Self {
            year,
            counts: FALLBACK_MONTHLY_COUNTS,
            origin: DataOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// Adds `count` to the month of `date` when it falls in the target year.
    ///
    /// Returns false if the date was outside the year and ignored.
    pub fn record(&mut self, date: NaiveDate, count: u64) -> bool {
        if date.year() != self.year {
            return false;
        }
        let month = date.month0() as usize;
        self.counts[month] = self.counts[month].saturating_add(count);
        true
    }

    /// Target year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Count for a month label (`"Jan"`...`"Dec"`).
    #[must_use]
    pub fn get(&self, month: &str) -> Option<u64> {
        MONTH_LABELS
            .iter()
            .position(|label| *label == month)
            .map(|i| self.counts[i])
    }

    /// Always 12.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates `(month_label, count)` from January to December.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        MONTH_LABELS.iter().copied().zip(self.counts.iter().copied())
    }

    /// Sum over the year.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Where the counts came from.
    #[must_use]
    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    /// Returns true for the placeholder calendar.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }
}

fn serialize_months<S: Serializer>(counts: &[u64; 12], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(MONTH_LABELS.iter().zip(counts.iter()))
}

/// Commit listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Commit hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Author name.
    pub author: String,
    /// Author date.
    pub date: Option<DateTime<Utc>>,
    /// Browser URL.
    pub url: Option<String>,
}

/// Line statistics for a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitStats {
    /// Added lines.
    pub additions: u64,
    /// Deleted lines.
    pub deletions: u64,
    /// Total changed lines.
    pub total: u64,
}

/// A file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Path after the change.
    pub filename: String,
    /// `added`, `modified`, `removed` or `renamed`.
    pub status: String,
    /// Added lines.
    pub additions: u64,
    /// Deleted lines.
    pub deletions: u64,
    /// Unified diff, when the provider includes one.
    pub patch: Option<String>,
}

/// A single commit with statistics and changed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDetail {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: CommitSummary,
    /// Line statistics.
    pub stats: CommitStats,
    /// Changed files.
    pub files: Vec<ChangedFile>,
}

/// Kind of a repository tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Submodule, symlink or anything else.
    Other(String),
}

/// A file or directory inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoEntry {
    /// Base name.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Path from the repository root.
    pub path: String,
    /// Size in bytes, for files when reported.
    pub size: Option<u64>,
    /// Browser URL.
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn repo(name: &str, stars: u64, forks: u64, day: u32) -> RepositoryRecord {
        RepositoryRecord {
            id: u64::from(day),
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            description: None,
            primary_language: None,
            star_count: stars,
            fork_count: forks,
            last_updated: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            web_url: format!("https://github.com/octocat/{name}"),
            languages_endpoint: String::new(),
            size_hint: 0,
            default_branch: None,
        }
    }

    #[test]
    fn display_name_falls_back_to_login() {
        assert_eq!(Profile::display_name_or_login(None, "octocat"), "octocat");
        assert_eq!(Profile::display_name_or_login(Some("  "), "octocat"), "octocat");
        assert_eq!(
            Profile::display_name_or_login(Some("The Octocat"), "octocat"),
            "The Octocat"
        );
    }

    #[test]
    fn repo_sort_orders_descending() {
        let mut repos = vec![repo("a", 1, 9, 3), repo("b", 5, 2, 1), repo("c", 3, 4, 2)];

        RepoSort::Stars.sort(&mut repos);
        assert_eq!(repos[0].name, "b");
        assert!(RepoSort::Stars.is_sorted(&repos));

        RepoSort::Forks.sort(&mut repos);
        assert_eq!(repos[0].name, "a");
        assert!(RepoSort::Forks.is_sorted(&repos));

        RepoSort::Recency.sort(&mut repos);
        assert_eq!(repos[0].name, "a");
        assert_eq!(repos[2].name, "b");
        assert!(RepoSort::Recency.is_sorted(&repos));
    }

    #[test]
    fn repo_sort_parses_aliases() {
        assert_eq!("updated".parse::<RepoSort>(), Ok(RepoSort::Recency));
        assert_eq!("Stars".parse::<RepoSort>(), Ok(RepoSort::Stars));
        assert!("size".parse::<RepoSort>().is_err());
    }

    #[test]
    fn language_tally_ignores_negative_and_nan() {
        let mut tally = LanguageTally::new();
        tally.add("Rust", 100.0);
        tally.add("Rust", -50.0);
        tally.add("Rust", f64::NAN);
        tally.add("Go", 0.0);
        assert_eq!(tally.get("Rust"), Some(100.0));
        assert_eq!(tally.get("Go"), Some(0.0));
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn language_tally_iterates_in_name_order() {
        let mut tally = LanguageTally::new();
        tally.add("Shell", 1.0);
        tally.add("C", 2.0);
        tally.add("Rust", 3.0);
        let names: Vec<_> = tally.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["C", "Rust", "Shell"]);
    }

    #[test]
    fn commit_tally_failure_counts_as_zero() {
        let mut tally = CommitTally::new();
        tally.insert("alpha", 12);
        tally.record_failure(ItemFailure {
            item: "beta".to_string(),
            reason: "HTTP 409".to_string(),
        });
        assert_eq!(tally.get("beta"), Some(0));
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.skipped().len(), 1);
        let names: Vec<_> = tally.names().collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn commit_tally_serializes_as_ordered_map() {
        let mut tally = CommitTally::new();
        tally.insert("zeta", 1);
        tally.insert("alpha", 2);
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"counts":{"zeta":1,"alpha":2},"skipped":[]}"#);
    }

    #[test]
    fn calendar_always_has_twelve_months() {
        let calendar = ContributionCalendar::new(2024);
        assert_eq!(calendar.len(), 12);
        assert_eq!(calendar.iter().count(), 12);
        assert_eq!(calendar.total(), 0);

        let fallback = ContributionCalendar::fallback(2024, "boom");
        assert_eq!(fallback.len(), 12);
        assert!(fallback.is_fallback());
        assert_eq!(fallback.get("Jun"), Some(30));
    }

    #[test]
    fn calendar_ignores_other_years() {
        let mut calendar = ContributionCalendar::new(2024);
        assert!(calendar.record(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 4));
        assert!(!calendar.record(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), 9));
        assert_eq!(calendar.get("Mar"), Some(4));
        assert_eq!(calendar.total(), 4);
        assert!(!calendar.is_fallback());
    }

    #[test]
    fn calendar_serializes_month_labels() {
        let calendar = ContributionCalendar::new(2024);
        let value = serde_json::to_value(&calendar).unwrap();
        assert_eq!(value["year"], 2024);
        assert_eq!(value["months"]["Jan"], 0);
        assert_eq!(value["origin"]["kind"], "live");
    }
}
