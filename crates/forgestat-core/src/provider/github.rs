// SPDX-License-Identifier: Apache-2.0

//! GitHub adapter (REST v3 plus the GraphQL contribution calendar).

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::http::HttpTransport;
use super::{ForgeProvider, encode_component, encode_path};
use crate::config::{HttpConfig, ProviderConfig, ProviderKind};
use crate::error::ForgeError;
use crate::model::{
    ActivityDetails, ActivityEvent, ActivityKind, ChangedFile, CommitDetail, CommitStats,
    CommitSummary, ContributionCalendar, EntryKind, Profile, RepoEntry, RepoSort,
    RepositoryRecord,
};

const CONTRIBUTIONS_QUERY: &str = r"
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        weeks {
          contributionDays {
            contributionCount
            date
          }
        }
      }
    }
  }
}";

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
    #[serde(default)]
    avatar_url: String,
    name: Option<String>,
    bio: Option<String>,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    #[serde(default)]
    public_repos: u64,
    location: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    id: u64,
    name: String,
    full_name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    updated_at: DateTime<Utc>,
    html_url: String,
    languages_url: String,
    #[serde(default)]
    size: u64,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhRepoRef {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct GhPayload {
    action: Option<String>,
    ref_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhEvent {
    #[serde(rename = "type")]
    event_type: String,
    repo: GhRepoRef,
    #[serde(default)]
    payload: GhPayload,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GhCommitAuthor {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhCommitInfo {
    message: String,
    author: Option<GhCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    html_url: Option<String>,
    commit: GhCommitInfo,
}

#[derive(Debug, Default, Deserialize)]
struct GhStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct GhFile {
    filename: String,
    status: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    patch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhCommitDetail {
    #[serde(flatten)]
    commit: GhCommit,
    #[serde(default)]
    stats: GhStats,
    #[serde(default)]
    files: Vec<GhFile>,
}

#[derive(Debug, Deserialize)]
struct GhContent {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    size: Option<u64>,
    html_url: Option<String>,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GhContents {
    Listing(Vec<GhContent>),
    Single(Box<GhContent>),
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    user: Option<GraphQlUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlUser {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: CalendarWeeks,
}

#[derive(Debug, Deserialize)]
struct CalendarWeeks {
    weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarWeek {
    contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionDay {
    contribution_count: u64,
    date: NaiveDate,
}

impl From<GhUser> for Profile {
    fn from(user: GhUser) -> Self {
        Profile {
            display_name: Profile::display_name_or_login(user.name.as_deref(), &user.login),
            login: user.login,
            avatar_url: user.avatar_url,
            bio: user.bio.filter(|b| !b.trim().is_empty()),
            follower_count: user.followers,
            following_count: user.following,
            public_repo_count: user.public_repos,
            location: user.location.filter(|l| !l.trim().is_empty()),
            profile_url: user.html_url,
        }
    }
}

impl From<GhRepo> for RepositoryRecord {
    fn from(repo: GhRepo) -> Self {
        RepositoryRecord {
            id: repo.id,
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            primary_language: repo.language,
            star_count: repo.stargazers_count,
            fork_count: repo.forks_count,
            last_updated: repo.updated_at,
            web_url: repo.html_url,
            languages_endpoint: repo.languages_url,
            size_hint: repo.size,
            default_branch: repo.default_branch,
        }
    }
}

impl From<GhEvent> for ActivityEvent {
    fn from(event: GhEvent) -> Self {
        let kind = match event.event_type.as_str() {
            "PushEvent" => ActivityKind::Push,
            "CreateEvent" => ActivityKind::Create,
            "PullRequestEvent" => ActivityKind::PullRequest,
            "IssuesEvent" => ActivityKind::Issue,
            "WatchEvent" => ActivityKind::Watch,
            other => ActivityKind::Other(other.to_string()),
        };
        ActivityEvent {
            kind,
            subject_repo: event.repo.name,
            details: ActivityDetails {
                action: event.payload.action,
                target: event.payload.ref_type,
            },
            timestamp: event.created_at,
        }
    }
}

impl From<GhCommit> for CommitSummary {
    fn from(commit: GhCommit) -> Self {
        let (author, date) = match commit.commit.author {
            Some(a) => (a.name.unwrap_or_default(), a.date),
            None => (String::new(), None),
        };
        CommitSummary {
            sha: commit.sha,
            message: commit.commit.message,
            author,
            date,
            url: commit.html_url,
        }
    }
}

impl From<GhContent> for RepoEntry {
    fn from(item: GhContent) -> Self {
        let kind = match item.entry_type.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            other => EntryKind::Other(other.to_string()),
        };
        RepoEntry {
            size: item.size.filter(|_| kind == EntryKind::File),
            name: item.name,
            kind,
            path: item.path,
            url: item.html_url,
        }
    }
}

/// GitHub-shaped provider.
#[derive(Debug)]
pub struct GitHubProvider {
    http: HttpTransport,
    login: String,
    concurrency: usize,
}

impl GitHubProvider {
    /// Creates the adapter for `config.identity()`.
    pub fn new(
        config: &ProviderConfig,
        http: &HttpConfig,
        concurrency: usize,
    ) -> crate::Result<Self> {
        Ok(Self {
            http: HttpTransport::new(config, http)?,
            login: config.identity().to_string(),
            concurrency,
        })
    }

    fn user_url(&self, rest: &str) -> String {
        self.http
            .endpoint(&format!("/users/{}{}", encode_component(&self.login), rest))
    }

    fn repo_url(&self, repo: &RepositoryRecord, rest: &str) -> String {
        self.http
            .endpoint(&format!("/repos/{}{}", repo.full_name, rest))
    }
}

fn sort_param(sort: RepoSort) -> &'static str {
    match sort {
        RepoSort::Recency => "updated",
        RepoSort::Stars => "stars",
        RepoSort::Forks => "forks",
    }
}

fn decode_content(content: &str) -> Result<String, String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

#[async_trait]
impl ForgeProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn identity(&self) -> &str {
        &self.login
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[instrument(skip(self), fields(login = %self.login))]
    async fn load_profile(&self) -> crate::Result<Profile> {
        let url = self.user_url("");
        let user: GhUser = self.http.get_json("load_profile", &url, &[]).await?;
        Ok(user.into())
    }

    #[instrument(skip(self), fields(login = %self.login))]
    async fn load_repositories(
        &self,
        sort: RepoSort,
        page_size: u32,
    ) -> crate::Result<Vec<RepositoryRecord>> {
        let url = self.user_url("/repos");
        let query = [
            ("sort", sort_param(sort).to_string()),
            ("direction", "desc".to_string()),
            ("per_page", page_size.to_string()),
        ];
        let repos: Vec<GhRepo> = self
            .http
            .get_json("load_repositories", &url, &query)
            .await?;

        let mut records: Vec<RepositoryRecord> = repos.into_iter().map(Into::into).collect();
        sort.sort(&mut records);
        debug!(count = records.len(), "Loaded repositories");
        Ok(records)
    }

    async fn fetch_activity(&self, page_size: u32) -> crate::Result<Vec<ActivityEvent>> {
        let url = self.user_url("/events");
        let query = [("per_page", page_size.to_string())];
        let events: Vec<GhEvent> = self.http.get_json("load_activity", &url, &query).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    async fn fetch_repo_languages(
        &self,
        repo: &RepositoryRecord,
    ) -> crate::Result<Vec<(String, f64)>> {
        let bytes: BTreeMap<String, f64> = self
            .http
            .get_json("load_languages", &repo.languages_endpoint, &[])
            .await?;
        Ok(bytes.into_iter().collect())
    }

    async fn count_repo_commits(
        &self,
        repo: &RepositoryRecord,
        page_size: u32,
    ) -> crate::Result<u64> {
        let url = self.repo_url(repo, "/commits");
        let query = [("per_page", page_size.to_string())];
        let commits: Vec<Value> = self
            .http
            .get_json("load_commit_tally", &url, &query)
            .await?;
        Ok(commits.len() as u64)
    }

    #[instrument(skip(self), fields(login = %self.login))]
    async fn fetch_contributions(&self, year: i32) -> crate::Result<ContributionCalendar> {
        let payload = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": {
                "login": self.login,
                "from": format!("{year}-01-01T00:00:00Z"),
                "to": format!("{year}-12-31T23:59:59Z"),
            }
        });
        let url = self.http.endpoint("/graphql");
        let response: GraphQlResponse = self
            .http
            .post_json("load_contributions", &url, &payload)
            .await?;

        if let Some(error) = response.errors.first() {
            return Err(ForgeError::upstream(
                ProviderKind::GitHub.as_str(),
                "load_contributions",
                error.message.clone(),
            ));
        }
        let user = response
            .data
            .and_then(|data| data.user)
            .ok_or_else(|| ForgeError::UserNotFound {
                provider: ProviderKind::GitHub.to_string(),
                identity: self.login.clone(),
            })?;

        let mut calendar = ContributionCalendar::new(year);
        for week in user.contributions_collection.contribution_calendar.weeks {
            for day in week.contribution_days {
                calendar.record(day.date, day.contribution_count);
            }
        }
        Ok(calendar)
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_repo_commits(
        &self,
        repo: &RepositoryRecord,
        page: u32,
        per_page: u32,
    ) -> crate::Result<Vec<CommitSummary>> {
        let url = self.repo_url(repo, "/commits");
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        let commits: Vec<GhCommit> = self
            .http
            .get_json("load_repo_commits", &url, &query)
            .await?;
        Ok(commits.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_commit_details(
        &self,
        repo: &RepositoryRecord,
        sha: &str,
    ) -> crate::Result<CommitDetail> {
        let url = self.repo_url(repo, &format!("/commits/{}", encode_component(sha)));
        let detail: GhCommitDetail = self
            .http
            .get_json("load_commit_details", &url, &[])
            .await?;

        Ok(CommitDetail {
            summary: detail.commit.into(),
            stats: CommitStats {
                additions: detail.stats.additions,
                deletions: detail.stats.deletions,
                total: detail.stats.total,
            },
            files: detail
                .files
                .into_iter()
                .map(|f| ChangedFile {
                    filename: f.filename,
                    status: f.status,
                    additions: f.additions,
                    deletions: f.deletions,
                    patch: f.patch,
                })
                .collect(),
        })
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_repo_files(
        &self,
        repo: &RepositoryRecord,
        path: &str,
    ) -> crate::Result<Vec<RepoEntry>> {
        let url = self.repo_url(repo, &format!("/contents/{}", encode_path(path)));
        let contents: GhContents = self.http.get_json("load_repo_files", &url, &[]).await?;
        let entries = match contents {
            GhContents::Listing(items) => items.into_iter().map(Into::into).collect(),
            GhContents::Single(item) => vec![(*item).into()],
        };
        Ok(entries)
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_file_content(
        &self,
        repo: &RepositoryRecord,
        path: &str,
    ) -> crate::Result<String> {
        let url = self.repo_url(repo, &format!("/contents/{}", encode_path(path)));
        let contents: GhContents = self
            .http
            .get_json("load_file_content", &url, &[])
            .await?;

        let GhContents::Single(item) = contents else {
            return Err(ForgeError::upstream(
                ProviderKind::GitHub.as_str(),
                "load_file_content",
                format!("'{path}' is a directory"),
            ));
        };

        match (item.content, item.encoding.as_deref()) {
            (Some(content), Some("base64")) => decode_content(&content).map_err(|e| {
                ForgeError::upstream(ProviderKind::GitHub.as_str(), "load_file_content", e)
            }),
            (Some(content), _) => Ok(content),
            (None, _) => Err(ForgeError::upstream(
                ProviderKind::GitHub.as_str(),
                "load_file_content",
                format!("'{path}' has no inline content"),
            )),
        }
    }
}
