// SPDX-License-Identifier: Apache-2.0

//! Text rendering of the aggregated tallies and chart series.

use console::style;
use forgestat_core::{
    ChartData, ChartSeries, CommitTally, ContributionCalendar, LanguageTally, format_file_size,
    format_number,
};
use std::io::{self, Write};

use crate::cli::OutputContext;

use super::Renderable;
use super::common::{BAR_WIDTH, bar, write_origin_notice, write_skipped};

#[allow(clippy::cast_precision_loss)]
fn as_f64(n: u64) -> f64 {
    n as f64
}

impl Renderable for LanguageTally {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style("Languages").bold())?;

        let total = self.total();
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1));
        let max = rows.first().map_or(0.0, |(_, size)| *size);

        if rows.is_empty() {
            writeln!(w, "  {}", style("No language data").dim())?;
        }
        for (language, size) in rows {
            let share = if total > 0.0 { size / total * 100.0 } else { 0.0 };
            writeln!(
                w,
                "  {:<20} {:<width$} {:>5.1}%  {}",
                language,
                style(bar(size, max, BAR_WIDTH)).cyan(),
                share,
                style(format_file_size(size)).dim(),
                width = BAR_WIDTH
            )?;
        }
        write_skipped(w, self.skipped(), ctx.verbose)?;
        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for CommitTally {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style("Commits per repository (sampled)").bold())?;

        let max = self.iter().map(|(_, count)| count).max().unwrap_or(0);
        if self.is_empty() {
            writeln!(w, "  {}", style("No repositories").dim())?;
        }
        for (repo, count) in self.iter() {
            writeln!(
                w,
                "  {:<30} {:<width$} {}",
                repo,
                style(bar(as_f64(count), as_f64(max), BAR_WIDTH)).green(),
                format_number(count),
                width = BAR_WIDTH
            )?;
        }
        write_skipped(w, self.skipped(), ctx.verbose)?;
        writeln!(w)?;
        Ok(())
    }
}

impl Renderable for ContributionCalendar {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(
            w,
            "{} {}",
            style(format!("Contributions in {}", self.year())).bold(),
            style(format!("({} total)", format_number(self.total()))).dim()
        )?;
        write_origin_notice(w, "Contributions", self.origin())?;

        let max = self.iter().map(|(_, count)| count).max().unwrap_or(0);
        for (month, count) in self.iter() {
            writeln!(
                w,
                "  {month}  {:<width$} {}",
                style(bar(as_f64(count), as_f64(max), BAR_WIDTH)).green(),
                format_number(count),
                width = BAR_WIDTH
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}

fn write_series<T: std::fmt::Display>(
    w: &mut dyn Write,
    title: &str,
    series: &ChartSeries<T>,
) -> io::Result<()> {
    writeln!(w, "{}", style(title).bold())?;
    if series.is_empty() {
        writeln!(w, "  {}", style("(empty)").dim())?;
    }
    for (label, value) in series.labels.iter().zip(&series.values) {
        writeln!(w, "  {label:<30} {value}")?;
    }
    writeln!(w)
}

impl Renderable for ChartData {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        write_series(w, "Languages (bytes)", &self.languages)?;
        write_series(w, "Commits (top repositories)", &self.commits)?;
        write_series(w, "Contributions (by month)", &self.contributions)?;
        Ok(())
    }
}
