// SPDX-License-Identifier: Apache-2.0

//! Repository browsing commands.

use anyhow::{Context, Result};
use forgestat_core::ForgeStats;

use super::types::{CommitsResult, FileResult, FilesResult};
use crate::cli::{BrowseCommand, OutputContext};
use crate::output;

/// Loads the repository list, then runs one browse command against it.
pub async fn run(command: BrowseCommand, stats: &mut ForgeStats, ctx: &OutputContext) -> Result<()> {
    stats
        .load_repositories()
        .await
        .context("Failed to load repositories")?;

    match command {
        BrowseCommand::Commits {
            repo,
            page,
            per_page,
        } => {
            let commits = stats.load_repo_commits(&repo, page, per_page).await?;
            output::render(
                &CommitsResult {
                    repo,
                    page: page.max(1),
                    commits,
                },
                ctx,
            )
        }
        BrowseCommand::Commit { repo, sha } => {
            let detail = stats.load_commit_details(&repo, &sha).await?;
            output::render(&detail, ctx)
        }
        BrowseCommand::Files { repo, path } => {
            let entries = stats.load_repo_files(&repo, &path).await?;
            output::render(
                &FilesResult {
                    repo,
                    path,
                    entries,
                },
                ctx,
            )
        }
        BrowseCommand::File { repo, path } => {
            let content = stats.load_file_content(&repo, &path).await?;
            output::render(
                &FileResult {
                    repo,
                    path,
                    content,
                },
                ctx,
            )
        }
    }
}
