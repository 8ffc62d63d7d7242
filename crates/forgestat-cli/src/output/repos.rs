// SPDX-License-Identifier: Apache-2.0

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use forgestat_core::{format_number, truncate};
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::ReposResult;

use super::Renderable;

/// Description column width before truncation.
const DESCRIPTION_WIDTH: usize = 48;

impl Renderable for ReposResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(
            w,
            "{} {}",
            style("Repositories").bold(),
            style(format!("(by {})", self.sort)).dim()
        )?;

        if self.repos.is_empty() {
            writeln!(w, "  {}", style("No repositories").dim())?;
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Name",
                "Language",
                "Stars",
                "Forks",
                "Updated",
                "Description",
            ]);
        for repo in &self.repos {
            table.add_row(vec![
                Cell::new(&repo.name),
                Cell::new(&repo.language),
                Cell::new(format_number(repo.stars)).set_alignment(CellAlignment::Right),
                Cell::new(format_number(repo.forks)).set_alignment(CellAlignment::Right),
                Cell::new(&repo.updated_at),
                Cell::new(truncate(&repo.description, DESCRIPTION_WIDTH)),
            ]);
        }
        writeln!(w, "{table}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use forgestat_core::{RepoSort, RepoView};

    #[test]
    fn test_repos_table() {
        let result = ReposResult {
            sort: RepoSort::Stars,
            repos: vec![RepoView {
                name: "hello".to_string(),
                description: "No description".to_string(),
                language: "Rust".to_string(),
                stars: 1500,
                forks: 3,
                updated_at: "Jan 1, 2024".to_string(),
                url: "https://github.com/octocat/hello".to_string(),
            }],
        };
        let ctx = OutputContext::from_cli(OutputFormat::Text, false);
        let mut out = Vec::new();
        result.render_text(&mut out, &ctx).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(by stars)"));
        assert!(text.contains("hello"));
        assert!(text.contains("1,500"));
    }
}
