// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the forgestat CLI.

pub mod browse;
pub mod types;

use anyhow::{Context, Result};
use forgestat_core::{
    AppConfig, DataOrigin, FailurePolicy, ForgeStats, load_config, load_config_from,
    render::{render_activity, render_profile},
};
use tracing::debug;

use crate::CliTokenProvider;
use crate::cli::{Cli, Commands, OutputContext};
use crate::output;
use types::{ActivityResult, ReposResult};

/// Loads configuration and applies command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    if let Some(kind) = cli.provider {
        config.provider.kind = kind;
        debug!("Overriding provider to: {kind}");
    }
    if let Some(user) = &cli.user {
        config.provider.username = Some(user.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.provider.base_url = Some(base_url.clone());
        debug!("Overriding API base URL to: {base_url}");
    }
    if cli.strict {
        config.aggregate.failure_policy = FailurePolicy::Strict;
    }
    Ok(config)
}

/// Under the strict policy, refuses substituted data from a single-entity command.
fn ensure_live(origin: &DataOrigin, policy: FailurePolicy, what: &str) -> Result<()> {
    if let (FailurePolicy::Strict, DataOrigin::Fallback { reason }) = (policy, origin) {
        anyhow::bail!("{what} unavailable: {reason}");
    }
    Ok(())
}

/// Dispatch to the appropriate command handler.
pub async fn run(cli: Cli, ctx: OutputContext) -> Result<()> {
    let config = resolve_config(&cli)?;
    let mut stats = ForgeStats::connect(&config, &CliTokenProvider)?;
    let policy = stats.options().failure_policy;

    match cli.command {
        Commands::Summary => {
            stats.load_all().await?;
            output::render(&stats.snapshot(), &ctx)
        }

        Commands::Profile => {
            let profile = stats.provider().load_profile().await?;
            output::render(&render_profile(&profile), &ctx)
        }

        Commands::Repos { sort } => {
            if let Some(sort) = sort {
                stats.options_mut().sort = sort;
            }
            stats.load_repositories().await?;
            let sort = stats.options().sort;
            output::render(
                &ReposResult {
                    sort,
                    repos: stats.render_repos(sort),
                },
                &ctx,
            )
        }

        Commands::Activity => {
            let page_size = stats.options().activity_page_size;
            let feed = stats.provider().load_activity(page_size).await;
            ensure_live(&feed.origin, policy, "Activity")?;
            let events = feed
                .value
                .iter()
                .map(render_activity)
                .collect();
            output::render(
                &ActivityResult {
                    origin: feed.origin,
                    events,
                },
                &ctx,
            )
        }

        Commands::Languages => {
            stats.load_all().await?;
            output::render(stats.languages(), &ctx)
        }

        Commands::Commits => {
            stats.load_all().await?;
            output::render(stats.commits(), &ctx)
        }

        Commands::Contributions { year } => {
            if let Some(year) = year {
                stats.options_mut().year = year;
            }
            let calendar = stats
                .provider()
                .load_contributions(stats.options().year)
                .await;
            ensure_live(calendar.origin(), policy, "Contributions")?;
            output::render(&calendar, &ctx)
        }

        Commands::Charts => {
            stats.load_all().await?;
            output::render(&stats.chart_data(), &ctx)
        }

        Commands::Browse(command) => browse::run(command, &mut stats, &ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn ensure_live_only_rejects_strict_fallbacks() {
        let fallback = DataOrigin::Fallback {
            reason: "HTTP 502".to_string(),
        };
        assert!(ensure_live(&fallback, FailurePolicy::Resilient, "Activity").is_ok());
        assert!(ensure_live(&DataOrigin::Live, FailurePolicy::Strict, "Activity").is_ok());

        let err = ensure_live(&fallback, FailurePolicy::Strict, "Activity").unwrap_err();
        assert_eq!(err.to_string(), "Activity unavailable: HTTP 502");
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[provider]\nkind = \"github\"\nusername = \"octocat\"\n\n[fetch]\nconcurrency = 2\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "forgestat",
            "--config",
            path.to_str().unwrap(),
            "--provider",
            "gitlab",
            "--strict",
            "profile",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.provider.kind, forgestat_core::ProviderKind::GitLab);
        assert_eq!(config.provider.username.as_deref(), Some("octocat"));
        assert_eq!(config.fetch.concurrency, 2);
        assert_eq!(config.aggregate.failure_policy, FailurePolicy::Strict);
    }
}
