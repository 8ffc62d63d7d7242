// SPDX-License-Identifier: Apache-2.0

//! GitLab adapter (REST v4).
//!
//! Most user-scoped endpoints take the numeric user id rather than the
//! username. The id is resolved once per provider instance and reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::http::HttpTransport;
use super::{ForgeProvider, encode_component, encode_path};
use crate::config::{HttpConfig, ProviderConfig, ProviderKind};
use crate::error::ForgeError;
use crate::fanout::{ItemOutcome, fan_out};
use crate::model::{
    ActivityDetails, ActivityEvent, ActivityKind, ChangedFile, CommitDetail, CommitStats,
    CommitSummary, ContributionCalendar, EntryKind, Profile, RepoEntry, RepoSort,
    RepositoryRecord,
};

/// Page size of the calendar's event query.
const CONTRIBUTION_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct GlUserRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GlUser {
    username: String,
    name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    #[serde(default)]
    public_repos: u64,
    location: Option<String>,
    web_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlStatistics {
    #[serde(default)]
    repository_size: u64,
}

#[derive(Debug, Deserialize)]
struct GlProject {
    id: u64,
    name: String,
    path_with_namespace: String,
    description: Option<String>,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    forks_count: u64,
    last_activity_at: DateTime<Utc>,
    web_url: String,
    default_branch: Option<String>,
    statistics: Option<GlStatistics>,
}

#[derive(Debug, Deserialize)]
struct GlProjectRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GlPushData {
    ref_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlEvent {
    action_name: String,
    target_type: Option<String>,
    project_id: Option<u64>,
    push_data: Option<GlPushData>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GlEventDate {
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct GlStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct GlCommit {
    id: String,
    message: String,
    #[serde(default)]
    author_name: String,
    created_at: Option<DateTime<Utc>>,
    web_url: Option<String>,
    stats: Option<GlStats>,
}

#[derive(Debug, Deserialize)]
struct GlDiff {
    new_path: String,
    #[serde(default)]
    new_file: bool,
    #[serde(default)]
    renamed_file: bool,
    #[serde(default)]
    deleted_file: bool,
    #[serde(default)]
    diff: String,
}

#[derive(Debug, Deserialize)]
struct GlTreeItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

impl From<GlUser> for Profile {
    fn from(user: GlUser) -> Self {
        Profile {
            display_name: Profile::display_name_or_login(user.name.as_deref(), &user.username),
            login: user.username,
            avatar_url: user.avatar_url.unwrap_or_default(),
            bio: user.bio.filter(|b| !b.trim().is_empty()),
            follower_count: user.followers,
            following_count: user.following,
            public_repo_count: user.public_repos,
            location: user.location.filter(|l| !l.trim().is_empty()),
            profile_url: user.web_url,
        }
    }
}

impl From<GlCommit> for CommitSummary {
    fn from(commit: GlCommit) -> Self {
        CommitSummary {
            sha: commit.id,
            message: commit.message,
            author: commit.author_name,
            date: commit.created_at,
            url: commit.web_url,
        }
    }
}

impl From<GlDiff> for ChangedFile {
    fn from(diff: GlDiff) -> Self {
        let status = if diff.new_file {
            "added"
        } else if diff.deleted_file {
            "removed"
        } else if diff.renamed_file {
            "renamed"
        } else {
            "modified"
        };
        let (additions, deletions) = count_diff_lines(&diff.diff);
        ChangedFile {
            filename: diff.new_path,
            status: status.to_string(),
            additions,
            deletions,
            patch: Some(diff.diff).filter(|d| !d.is_empty()),
        }
    }
}

/// Counts added and removed lines in a unified diff body.
fn count_diff_lines(diff: &str) -> (u64, u64) {
    diff.lines().fold((0, 0), |(add, del), line| {
        if line.starts_with('+') && !line.starts_with("+++") {
            (add + 1, del)
        } else if line.starts_with('-') && !line.starts_with("---") {
            (add, del + 1)
        } else {
            (add, del)
        }
    })
}

fn classify_event(action: &str, target: Option<&str>) -> ActivityKind {
    match (action, target) {
        (_, Some("MergeRequest")) => ActivityKind::PullRequest,
        (_, Some("Issue")) => ActivityKind::Issue,
        (a, _) if a.starts_with("pushed") => ActivityKind::Push,
        ("created", _) => ActivityKind::Create,
        (other, _) => ActivityKind::Other(other.to_string()),
    }
}

fn order_param(sort: RepoSort) -> &'static str {
    match sort {
        RepoSort::Recency => "last_activity_at",
        RepoSort::Stars => "star_count",
        // No fork-count ordering upstream; the list is re-sorted locally.
        RepoSort::Forks => "last_activity_at",
    }
}

/// GitLab-shaped provider.
#[derive(Debug)]
pub struct GitLabProvider {
    http: HttpTransport,
    username: String,
    concurrency: usize,
    user_id: OnceCell<u64>,
}

impl GitLabProvider {
    /// Creates the adapter for `config.identity()`.
    pub fn new(
        config: &ProviderConfig,
        http: &HttpConfig,
        concurrency: usize,
    ) -> crate::Result<Self> {
        Ok(Self {
            http: HttpTransport::new(config, http)?,
            username: config.identity().to_string(),
            concurrency,
            user_id: OnceCell::new(),
        })
    }

    /// Resolves the numeric user id, querying the API at most once on success.
    pub async fn user_id(&self) -> crate::Result<u64> {
        self.user_id
            .get_or_try_init(|| self.resolve_user_id())
            .await
            .copied()
    }

    async fn resolve_user_id(&self) -> crate::Result<u64> {
        let url = self.http.endpoint("/users");
        let query = [("username", self.username.clone())];
        let users: Vec<GlUserRef> = self.http.get_json("resolve_user", &url, &query).await?;
        let id = users
            .first()
            .map(|u| u.id)
            .ok_or_else(|| ForgeError::UserNotFound {
                provider: ProviderKind::GitLab.to_string(),
                identity: self.username.clone(),
            })?;
        debug!(username = %self.username, id, "Resolved GitLab user id");
        Ok(id)
    }

    fn project_url(&self, repo: &RepositoryRecord, rest: &str) -> String {
        self.http
            .endpoint(&format!("/projects/{}{}", repo.id, rest))
    }

    /// Resolves project names for the given ids; unresolvable ids keep a placeholder.
    async fn project_names(&self, ids: Vec<u64>) -> BTreeMap<u64, String> {
        let items = ids.into_iter().map(|id| (id.to_string(), id)).collect();
        let result = fan_out(items, self.concurrency, |id| async move {
            let url = self.http.endpoint(&format!("/projects/{id}"));
            let project: GlProjectRef = self.http.get_json("load_activity", &url, &[]).await?;
            Ok::<_, ForgeError>((id, project.name))
        })
        .await;

        result
            .outcomes
            .into_iter()
            .filter_map(|(_, outcome)| match outcome {
                ItemOutcome::Success(pair) => Some(pair),
                ItemOutcome::Failed(_) => None,
            })
            .collect()
    }
}

fn branch_of(repo: &RepositoryRecord) -> String {
    repo.default_branch
        .clone()
        .unwrap_or_else(|| "HEAD".to_string())
}

#[async_trait]
impl ForgeProvider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[instrument(skip(self), fields(username = %self.username))]
    async fn load_profile(&self) -> crate::Result<Profile> {
        let id = self.user_id().await?;
        let url = self.http.endpoint(&format!("/users/{id}"));
        let user: GlUser = self.http.get_json("load_profile", &url, &[]).await?;
        Ok(user.into())
    }

    #[instrument(skip(self), fields(username = %self.username))]
    async fn load_repositories(
        &self,
        sort: RepoSort,
        page_size: u32,
    ) -> crate::Result<Vec<RepositoryRecord>> {
        let id = self.user_id().await?;
        let url = self.http.endpoint(&format!("/users/{id}/projects"));
        let query = [
            ("order_by", order_param(sort).to_string()),
            ("sort", "desc".to_string()),
            ("per_page", page_size.to_string()),
            ("statistics", "true".to_string()),
        ];
        let projects: Vec<GlProject> = self
            .http
            .get_json("load_repositories", &url, &query)
            .await?;

        let mut records: Vec<RepositoryRecord> = projects
            .into_iter()
            .map(|p| RepositoryRecord {
                languages_endpoint: self.http.endpoint(&format!("/projects/{}/languages", p.id)),
                size_hint: p.statistics.unwrap_or_default().repository_size,
                id: p.id,
                name: p.name,
                full_name: p.path_with_namespace,
                description: p.description,
                primary_language: None,
                star_count: p.star_count,
                fork_count: p.forks_count,
                last_updated: p.last_activity_at,
                web_url: p.web_url,
                default_branch: p.default_branch,
            })
            .collect();
        sort.sort(&mut records);
        debug!(count = records.len(), "Loaded repositories");
        Ok(records)
    }

    async fn fetch_activity(&self, page_size: u32) -> crate::Result<Vec<ActivityEvent>> {
        let id = self.user_id().await?;
        let url = self.http.endpoint(&format!("/users/{id}/events"));
        let query = [("per_page", page_size.to_string())];
        let events: Vec<GlEvent> = self.http.get_json("load_activity", &url, &query).await?;

        let mut project_ids: Vec<u64> = events.iter().filter_map(|e| e.project_id).collect();
        project_ids.sort_unstable();
        project_ids.dedup();
        let names = self.project_names(project_ids).await;

        Ok(events
            .into_iter()
            .map(|event| {
                let subject_repo = event
                    .project_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| "repository".to_string());
                let target = event
                    .target_type
                    .clone()
                    .or_else(|| event.push_data.and_then(|p| p.ref_type));
                ActivityEvent {
                    kind: classify_event(&event.action_name, event.target_type.as_deref()),
                    subject_repo,
                    details: ActivityDetails {
                        action: Some(event.action_name),
                        target,
                    },
                    timestamp: event.created_at,
                }
            })
            .collect())
    }

    async fn fetch_repo_languages(
        &self,
        repo: &RepositoryRecord,
    ) -> crate::Result<Vec<(String, f64)>> {
        let percentages: BTreeMap<String, f64> = self
            .http
            .get_json("load_languages", &repo.languages_endpoint, &[])
            .await?;
        #[allow(clippy::cast_precision_loss)]
        let size = repo.size_hint as f64;
        Ok(percentages
            .into_iter()
            .map(|(language, pct)| (language, pct * size / 100.0))
            .collect())
    }

    async fn count_repo_commits(
        &self,
        repo: &RepositoryRecord,
        page_size: u32,
    ) -> crate::Result<u64> {
        let url = self.project_url(repo, "/repository/commits");
        let query = [("per_page", page_size.to_string())];
        let commits: Vec<Value> = self
            .http
            .get_json("load_commit_tally", &url, &query)
            .await?;
        Ok(commits.len() as u64)
    }

    #[instrument(skip(self), fields(username = %self.username))]
    async fn fetch_contributions(&self, year: i32) -> crate::Result<ContributionCalendar> {
        let id = self.user_id().await?;
        let url = self.http.endpoint(&format!("/users/{id}/events"));
        // `after` and `before` are exclusive bounds.
        let query = [
            ("after", format!("{}-12-31", year - 1)),
            ("before", format!("{}-01-01", year + 1)),
            ("action", "pushed".to_string()),
            ("per_page", CONTRIBUTION_PAGE_SIZE.to_string()),
        ];
        let events: Vec<GlEventDate> = self
            .http
            .get_json("load_contributions", &url, &query)
            .await?;

        let mut calendar = ContributionCalendar::new(year);
        for event in events {
            calendar.record(event.created_at.date_naive(), 1);
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
        let url = self.project_url(repo, "/repository/commits");
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        let commits: Vec<GlCommit> = self
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
        let sha_segment = encode_component(sha);
        let url = self.project_url(repo, &format!("/repository/commits/{sha_segment}"));
        let diff_url = self.project_url(repo, &format!("/repository/commits/{sha_segment}/diff"));
        let stats_query = [("stats", "true".to_string())];

        let (commit, diffs) = tokio::join!(
            self.http
                .get_json::<GlCommit>("load_commit_details", &url, &stats_query),
            self.http
                .get_json::<Vec<GlDiff>>("load_commit_details", &diff_url, &[]),
        );
        let mut commit = commit?;
        let diffs = diffs?;

        let stats = commit.stats.take().unwrap_or_default();
        Ok(CommitDetail {
            summary: commit.into(),
            stats: CommitStats {
                additions: stats.additions,
                deletions: stats.deletions,
                total: stats.total,
            },
            files: diffs.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_repo_files(
        &self,
        repo: &RepositoryRecord,
        path: &str,
    ) -> crate::Result<Vec<RepoEntry>> {
        let url = self.project_url(repo, "/repository/tree");
        let branch = branch_of(repo);
        let query = [
            ("path", path.trim_matches('/').to_string()),
            ("ref", branch.clone()),
            ("per_page", "100".to_string()),
        ];
        let items: Vec<GlTreeItem> = self.http.get_json("load_repo_files", &url, &query).await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let (kind, view) = match item.entry_type.as_str() {
                    "blob" => (EntryKind::File, "blob"),
                    "tree" => (EntryKind::Dir, "tree"),
                    other => (EntryKind::Other(other.to_string()), "tree"),
                };
                RepoEntry {
                    url: Some(format!(
                        "{}/-/{view}/{branch}/{}",
                        repo.web_url,
                        encode_path(&item.path)
                    )),
                    name: item.name,
                    kind,
                    path: item.path,
                    size: None,
                }
            })
            .collect())
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn load_file_content(
        &self,
        repo: &RepositoryRecord,
        path: &str,
    ) -> crate::Result<String> {
        let url = self.project_url(
            repo,
            &format!(
                "/repository/files/{}/raw",
                encode_component(path.trim_matches('/'))
            ),
        );
        let query = [("ref", branch_of(repo))];
        self.http.get_text("load_file_content", &url, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_classify_merge_requests_as_pull_requests() {
        assert_eq!(
            classify_event("opened", Some("MergeRequest")),
            ActivityKind::PullRequest
        );
        assert_eq!(classify_event("closed", Some("Issue")), ActivityKind::Issue);
        assert_eq!(classify_event("pushed to", None), ActivityKind::Push);
        assert_eq!(classify_event("pushed new", None), ActivityKind::Push);
        assert_eq!(classify_event("created", None), ActivityKind::Create);
        assert_eq!(
            classify_event("joined", None),
            ActivityKind::Other("joined".to_string())
        );
    }

    #[test]
    fn diff_line_counts_skip_headers() {
        let diff = "@@ -1,2 +1,3 @@\n-old\n+new\n+extra\n context\n--- a\n+++ b\n";
        assert_eq!(count_diff_lines(diff), (2, 1));
    }

    #[test]
    fn diff_status_mapping() {
        let diff: GlDiff = serde_json::from_value(json!({
            "old_path": "a.txt",
            "new_path": "a.txt",
            "new_file": true,
            "renamed_file": false,
            "deleted_file": false,
            "diff": "+hello\n"
        }))
        .unwrap();
        let file = ChangedFile::from(diff);
        assert_eq!(file.status, "added");
        assert_eq!(file.additions, 1);
    }

    #[test]
    fn project_without_statistics_has_zero_size_hint() {
        let project: GlProject = serde_json::from_value(json!({
            "id": 7,
            "name": "demo",
            "path_with_namespace": "group/demo",
            "description": null,
            "star_count": 3,
            "forks_count": 1,
            "last_activity_at": "2024-04-01T00:00:00Z",
            "web_url": "https://gitlab.com/group/demo"
        }))
        .unwrap();
        assert_eq!(project.statistics.unwrap_or_default().repository_size, 0);
    }

    #[test]
    fn profile_name_falls_back_to_username() {
        let user: GlUser = serde_json::from_value(json!({
            "id": 1,
            "username": "gitlab-user",
            "name": "",
            "avatar_url": null
        }))
        .unwrap();
        let profile = Profile::from(user);
        assert_eq!(profile.display_name, "gitlab-user");
        assert_eq!(profile.avatar_url, "");
    }
}
