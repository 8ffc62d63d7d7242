// SPDX-License-Identifier: Apache-2.0

//! Text rendering of repository browsing results.

use console::style;
use forgestat_core::{
    CommitDetail, EntryKind, format_commit_message, format_date_time, format_file_size,
    format_relative_time,
};
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::{CommitsResult, FileResult, FilesResult};

use super::Renderable;

/// Abbreviated commit hash length.
const SHORT_SHA: usize = 7;

fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA).unwrap_or(sha)
}

impl Renderable for CommitsResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(
            w,
            "{} {}",
            style(format!("Commits in {}", self.repo)).bold(),
            style(format!("(page {})", self.page)).dim()
        )?;
        if self.commits.is_empty() {
            writeln!(w, "  {}", style("No commits").dim())?;
        }
        for commit in &self.commits {
            let when = commit
                .date
                .as_ref()
                .map(format_relative_time)
                .unwrap_or_default();
            writeln!(
                w,
                "  {} {}  {} {}",
                style(short_sha(&commit.sha)).yellow(),
                format_commit_message(&commit.message),
                style(&commit.author).cyan(),
                style(when).dim()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for CommitDetail {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let summary = &self.summary;
        writeln!(w)?;
        writeln!(w, "{} {}", style("commit").yellow(), style(&summary.sha).yellow())?;
        writeln!(w, "{} {}", style("Author:").dim(), summary.author)?;
        if let Some(date) = &summary.date {
            writeln!(w, "{} {}", style("Date:").dim(), format_date_time(date))?;
        }
        writeln!(w)?;
        for line in summary.message.lines() {
            writeln!(w, "    {line}")?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} files changed, {} insertions(+), {} deletions(-)",
            self.files.len(),
            style(self.stats.additions).green(),
            style(self.stats.deletions).red()
        )?;
        for file in &self.files {
            writeln!(
                w,
                "  {:<9} {}  {} {}",
                style(&file.status).dim(),
                file.filename,
                style(format!("+{}", file.additions)).green(),
                style(format!("-{}", file.deletions)).red()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for FilesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let location = if self.path.is_empty() {
            self.repo.clone()
        } else {
            format!("{}/{}", self.repo, self.path.trim_matches('/'))
        };
        writeln!(w)?;
        writeln!(w, "{}", style(location).bold())?;
        for entry in &self.entries {
            match &entry.kind {
                EntryKind::Dir => writeln!(w, "  {}/", style(&entry.name).blue())?,
                EntryKind::File => {
                    #[allow(clippy::cast_precision_loss)]
                    let size = entry
                        .size
                        .map(|bytes| format_file_size(bytes as f64))
                        .unwrap_or_default();
                    writeln!(w, "  {:<40} {}", entry.name, style(size).dim())?;
                }
                EntryKind::Other(kind) => {
                    writeln!(w, "  {} {}", entry.name, style(format!("({kind})")).dim())?;
                }
            }
        }
        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for FileResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        write!(w, "{}", self.content)?;
        if !self.content.ends_with('\n') {
            writeln!(w)?;
        }
        Ok(())
    }
}
