// SPDX-License-Identifier: Apache-2.0

//! Display projections of the fetched entities.
//!
//! These are the shapes front-ends consume: profile card, repository list,
//! activity feed and chart series. Missing optional fields get display
//! defaults here, never in the entities themselves.

use serde::Serialize;

use crate::formatters::{format_date, format_date_time};
use crate::model::{
    ActivityEvent, ActivityKind, CommitTally, ContributionCalendar, LanguageTally, Profile,
    RepoSort, RepositoryRecord,
};

/// Maximum number of repositories in the commit chart.
pub const COMMIT_CHART_LIMIT: usize = 10;

/// Profile card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    /// Avatar image URL.
    pub avatar_url: String,
    /// Display name.
    pub name: String,
    /// Biography or a placeholder.
    pub bio: String,
    /// Followers.
    pub followers: u64,
    /// Following.
    pub following: u64,
    /// Public repositories.
    pub public_repos: u64,
    /// Location, if set.
    pub location: Option<String>,
    /// Web profile URL, if known.
    pub profile_url: Option<String>,
}

/// Repository list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoView {
    /// Repository name.
    pub name: String,
    /// Description or a placeholder.
    pub description: String,
    /// Primary language or `N/A`.
    pub language: String,
    /// Stars.
    pub stars: u64,
    /// Forks.
    pub forks: u64,
    /// Last update, formatted as a short date.
    pub updated_at: String,
    /// Browser URL.
    pub url: String,
}

/// Activity feed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityView {
    /// Human-readable description.
    pub text: String,
    /// Icon key (`commit`, `create`, `pull-request`, `issue`, `star`, `event`).
    pub icon: &'static str,
    /// Event time, formatted.
    pub date: String,
}

/// One chart: parallel label and value sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries<T> {
    /// Labels.
    pub labels: Vec<String>,
    /// Values, one per label.
    pub values: Vec<T>,
}

impl<T> ChartSeries<T> {
    fn from_pairs<'a>(pairs: impl Iterator<Item = (&'a str, T)>) -> Self {
        let (labels, values): (Vec<_>, Vec<_>) =
            pairs.map(|(label, value)| (label.to_string(), value)).unzip();
        Self { labels, values }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Chart-ready projection of the tallies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// All languages in tally order.
    pub languages: ChartSeries<f64>,
    /// First [`COMMIT_CHART_LIMIT`] repositories in tally order.
    pub commits: ChartSeries<u64>,
    /// Twelve months, January first.
    pub contributions: ChartSeries<u64>,
}

/// Builds the profile card.
#[must_use]
pub fn render_profile(profile: &Profile) -> ProfileView {
    ProfileView {
        avatar_url: profile.avatar_url.clone(),
        name: profile.display_name.clone(),
        bio: profile
            .bio
            .clone()
            .unwrap_or_else(|| "No bio available".to_string()),
        followers: profile.follower_count,
        following: profile.following_count,
        public_repos: profile.public_repo_count,
        location: profile.location.clone(),
        profile_url: profile.profile_url.clone(),
    }
}

/// Builds repository rows ordered by `sort`.
#[must_use]
pub fn render_repos(repos: &[RepositoryRecord], sort: RepoSort) -> Vec<RepoView> {
    let mut sorted = repos.to_vec();
    sort.sort(&mut sorted);
    sorted
        .into_iter()
        .map(|repo| RepoView {
            description: repo
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description".to_string()),
            language: repo.primary_language.unwrap_or_else(|| "N/A".to_string()),
            stars: repo.star_count,
            forks: repo.fork_count,
            updated_at: format_date(&repo.last_updated),
            url: repo.web_url,
            name: repo.name,
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds one activity row.
#[must_use]
pub fn render_activity(event: &ActivityEvent) -> ActivityView {
    let repo = &event.subject_repo;
    let action = event.details.action.as_deref().map(capitalize);
    let (text, icon) = match &event.kind {
        ActivityKind::Push => (format!("Pushed to {repo}"), "commit"),
        ActivityKind::Create => {
            let target = event.details.target.as_deref().unwrap_or("repository");
            (format!("Created {target} in {repo}"), "create")
        }
        ActivityKind::PullRequest => (
            format!(
                "{} pull request in {repo}",
                action.as_deref().unwrap_or("Updated")
            ),
            "pull-request",
        ),
        ActivityKind::Issue => (
            format!("{} issue in {repo}", action.as_deref().unwrap_or("Updated")),
            "issue",
        ),
        ActivityKind::Watch => (format!("Starred {repo}"), "star"),
        ActivityKind::Other(name) => (format!("{name} in {repo}"), "event"),
    };
    ActivityView {
        text,
        icon,
        date: format_date_time(&event.timestamp),
    }
}

/// Builds the chart projection.
#[must_use]
pub fn chart_data(
    languages: &LanguageTally,
    commits: &CommitTally,
    contributions: &ContributionCalendar,
) -> ChartData {
    ChartData {
        languages: ChartSeries::from_pairs(languages.iter()),
        commits: ChartSeries::from_pairs(commits.iter().take(COMMIT_CHART_LIMIT)),
        contributions: ChartSeries::from_pairs(contributions.iter()),
    }
}
