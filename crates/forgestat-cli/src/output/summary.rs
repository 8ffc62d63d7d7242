// SPDX-License-Identifier: Apache-2.0

use console::style;
use forgestat_core::render::{render_activity, render_profile, render_repos};
use forgestat_core::{StatsSnapshot, format_file_size, format_number};
use std::io::{self, Write};

use crate::cli::OutputContext;

use super::Renderable;
use super::common::{write_origin_notice, write_skipped};

/// Rows shown per section in the overview.
const SUMMARY_ROWS: usize = 5;

impl Renderable for StatsSnapshot<'_> {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        match self.profile {
            Some(profile) => render_profile(profile).render_text(w, ctx)?,
            None => {
                writeln!(w)?;
                writeln!(w, "{} on {}", style(self.identity).bold(), self.provider)?;
                if let Some(error) = &self.report.profile_error {
                    writeln!(w, "{}", style(format!("Profile unavailable ({error})")).yellow())?;
                }
                writeln!(w)?;
            }
        }

        writeln!(
            w,
            "{} ({})",
            style("Repositories").bold(),
            self.repositories.len()
        )?;
        for repo in render_repos(self.repositories, self.sort).iter().take(SUMMARY_ROWS) {
            writeln!(
                w,
                "  {:<30} {:<12} {} {}",
                style(&repo.name).cyan(),
                style(&repo.language).yellow(),
                style("★").dim(),
                repo.stars
            )?;
        }
        writeln!(w)?;

        writeln!(w, "{}", style("Top languages").bold())?;
        let total = self.languages.total();
        let mut languages: Vec<_> = self.languages.iter().collect();
        languages.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (language, size) in languages.into_iter().take(SUMMARY_ROWS) {
            let share = if total > 0.0 { size / total * 100.0 } else { 0.0 };
            writeln!(
                w,
                "  {:<20} {:>5.1}%  {}",
                language,
                share,
                style(format_file_size(size)).dim()
            )?;
        }
        write_skipped(w, self.languages.skipped(), ctx.verbose)?;
        writeln!(w)?;

        if let Some(calendar) = self.contributions {
            writeln!(
                w,
                "{} {}",
                style(format!("Contributions in {}:", calendar.year())).bold(),
                format_number(calendar.total())
            )?;
            write_origin_notice(w, "Contributions", calendar.origin())?;
            writeln!(w)?;
        }

        if let Some(activity) = self.activity {
            writeln!(w, "{}", style("Recent activity").bold())?;
            write_origin_notice(w, "Activity", &activity.origin)?;
            for event in activity.value.iter().take(SUMMARY_ROWS) {
                let view = render_activity(event);
                writeln!(w, "  {}  {}", style(view.date).dim(), view.text)?;
            }
            writeln!(w)?;
        }

        if ctx.verbose {
            write_skipped(w, self.commits.skipped(), true)?;
        }
        Ok(())
    }
}
