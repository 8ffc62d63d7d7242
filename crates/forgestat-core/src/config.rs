// SPDX-License-Identifier: Apache-2.0

//! Configuration management for forgestat.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `FORGESTAT_`)
//! 2. Config file: `~/.config/forgestat/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Query GitLab instead of GitHub
//! FORGESTAT_PROVIDER__KIND=gitlab forgestat summary --user gitlab-org
//! ```
//!
//! Credentials are never read from the config file; they are supplied
//! through a [`crate::auth::TokenProvider`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bon::bon;
use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ForgeError;
use crate::model::RepoSort;

/// Default GitHub REST endpoint.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Default GitLab REST endpoint.
pub const GITLAB_API_BASE: &str = "https://gitlab.com/api/v4";

/// Source-control hosting provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// GitHub (REST v3 + GraphQL v4).
    #[default]
    GitHub,
    /// GitLab (REST v4).
    GitLab,
}

impl ProviderKind {
    /// Lowercase provider name used in logs, errors and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::GitLab => "gitlab",
        }
    }

    /// Public API endpoint used when none is configured.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::GitHub => GITHUB_API_BASE,
            ProviderKind::GitLab => GITLAB_API_BASE,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "gitlab" => Ok(ProviderKind::GitLab),
            other => Err(ForgeError::configuration(format!(
                "Unknown provider '{other}'. Expected 'github' or 'gitlab'"
            ))),
        }
    }
}

/// How Phase-1 failures other than the repository list are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Only the repository list is load-bearing; other failures degrade.
    #[default]
    Resilient,
    /// Profile failures and any fallback substitution abort the load.
    Strict,
}

/// Validated provider connection settings.
///
/// Immutable once constructed. The token is only exposed when building
/// request headers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    kind: ProviderKind,
    identity: String,
    credential: Option<SecretString>,
    endpoint_base: String,
}

#[bon]
impl ProviderConfig {
    /// Validates and builds the configuration.
    ///
    /// The identity is trimmed and must not be empty. An empty credential is
    /// treated as absent. The endpoint base defaults per provider kind and
    /// loses any trailing `/`.
    #[builder]
    pub fn new(
        kind: ProviderKind,
        #[builder(into)] identity: String,
        credential: Option<SecretString>,
        #[builder(into)] endpoint_base: Option<String>,
    ) -> crate::Result<Self> {
        let identity = identity.trim().to_string();
        if identity.is_empty() {
            return Err(ForgeError::configuration(format!(
                "A {kind} username is required (use --user or set provider.username)"
            )));
        }

        let credential = credential.filter(|token| !token.expose_secret().trim().is_empty());

        let endpoint_base = endpoint_base
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| kind.default_base_url().to_string());
        let endpoint_base = endpoint_base.trim_end_matches('/').to_string();

        Ok(Self {
            kind,
            identity,
            credential,
            endpoint_base,
        })
    }
}

impl ProviderConfig {
    /// Provider kind.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Username whose data is aggregated.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Access token, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn endpoint_base(&self) -> &str {
        &self.endpoint_base
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Provider selection.
    pub provider: ProviderSection,
    /// HTTP client settings.
    pub http: HttpConfig,
    /// Page sizes and fan-out.
    pub fetch: FetchConfig,
    /// Aggregation behaviour.
    pub aggregate: AggregateConfig,
}

/// Provider selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// `github` or `gitlab`.
    pub kind: ProviderKind,
    /// Default username.
    pub username: Option<String>,
    /// API base URL override (self-hosted instances).
    pub base_url: Option<String>,
}

/// HTTP client settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: concat!("forgestat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Page sizes and fan-out.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Repositories requested in one page.
    pub repo_page_size: u32,
    /// Activity events requested in one page.
    pub activity_page_size: u32,
    /// Commits sampled per repository.
    pub commit_page_size: u32,
    /// Concurrent per-repository sub-fetches.
    pub concurrency: usize,
    /// Repository sort key.
    pub sort: RepoSort,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            repo_page_size: 100,
            activity_page_size: 10,
            commit_page_size: 100,
            concurrency: 5,
            sort: RepoSort::Recency,
        }
    }
}

/// Aggregation behaviour.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Phase-1 failure policy.
    pub failure_policy: FailurePolicy,
}

/// Returns the forgestat configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/forgestat`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("forgestat");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("forgestat")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from the config file (if it exists) and environment variables.
/// Environment variables use the prefix `FORGESTAT_` and double underscore
/// for nested keys (e.g., `FORGESTAT_FETCH__CONCURRENCY`).
///
/// # Errors
///
/// Returns `ForgeError::Configuration` if the config file exists but is invalid.
pub fn load_config() -> crate::Result<AppConfig> {
    load_config_from(&config_file_path())
}

/// Load application configuration from an explicit file path.
///
/// The file is optional; environment variables still apply.
pub fn load_config_from(path: &Path) -> crate::Result<AppConfig> {
    let config = Config::builder()
        .add_source(File::with_name(path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("FORGESTAT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string().into())
    }

    #[test]
    #[serial]
    fn test_load_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.provider.kind, ProviderKind::GitHub);
        assert!(config.provider.username.is_none());
        assert_eq!(config.http.timeout_seconds, 10);
        assert!(config.http.user_agent.starts_with("forgestat/"));
        assert_eq!(config.fetch.repo_page_size, 100);
        assert_eq!(config.fetch.activity_page_size, 10);
        assert_eq!(config.fetch.commit_page_size, 100);
        assert_eq!(config.fetch.concurrency, 5);
        assert_eq!(config.fetch.sort, RepoSort::Recency);
        assert_eq!(config.aggregate.failure_policy, FailurePolicy::Resilient);
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[provider]
kind = "gitlab"
username = "gitlab-org"
base_url = "https://gitlab.example.com/api/v4/"

[fetch]
sort = "stars"
concurrency = 2

[aggregate]
failure_policy = "strict"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::GitLab);
        assert_eq!(config.provider.username.as_deref(), Some("gitlab-org"));
        assert_eq!(config.fetch.sort, RepoSort::Stars);
        assert_eq!(config.fetch.concurrency, 2);
        assert_eq!(config.fetch.repo_page_size, 100);
        assert_eq!(config.aggregate.failure_policy, FailurePolicy::Strict);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var("FORGESTAT_FETCH__COMMIT_PAGE_SIZE", "30");
        }
        let config = load_config_from(&dir.path().join("missing.toml"));

        // Cleanup
        unsafe {
            std::env::remove_var("FORGESTAT_FETCH__COMMIT_PAGE_SIZE");
        }

        assert_eq!(config.unwrap().fetch.commit_page_size, 30);
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nkind = \"bitbucket\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ForgeError::Configuration { .. }));
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_config_home() {
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/custom/config");
        }

        let dir = config_dir();
        assert_eq!(dir, PathBuf::from("/custom/config/forgestat"));

        // Cleanup
        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with("config.toml"));
        assert!(path.parent().unwrap().ends_with("forgestat"));
    }

    #[test]
    fn test_provider_config_rejects_blank_identity() {
        let err = ProviderConfig::builder()
            .kind(ProviderKind::GitHub)
            .identity("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, ForgeError::Configuration { .. }));
    }

    #[test]
    fn test_provider_config_defaults_endpoint() {
        let github = ProviderConfig::builder()
            .kind(ProviderKind::GitHub)
            .identity(" octocat ")
            .build()
            .unwrap();
        assert_eq!(github.identity(), "octocat");
        assert_eq!(github.endpoint_base(), "https://api.github.com");
        assert!(github.credential().is_none());

        let gitlab = ProviderConfig::builder()
            .kind(ProviderKind::GitLab)
            .identity("gitlab-org")
            .endpoint_base("https://gitlab.example.com/api/v4/")
            .build()
            .unwrap();
        assert_eq!(gitlab.endpoint_base(), "https://gitlab.example.com/api/v4");
    }

    #[test]
    fn test_provider_config_drops_empty_credential() {
        let config = ProviderConfig::builder()
            .kind(ProviderKind::GitHub)
            .identity("octocat")
            .credential(secret(""))
            .build()
            .unwrap();
        assert!(config.credential().is_none());

        let config = ProviderConfig::builder()
            .kind(ProviderKind::GitHub)
            .identity("octocat")
            .credential(secret("ghp_token"))
            .build()
            .unwrap();
        assert!(config.credential().is_some());
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("GitLab".parse::<ProviderKind>().unwrap(), ProviderKind::GitLab);
        assert!("bitbucket".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::GitHub.to_string(), "github");
    }
}
