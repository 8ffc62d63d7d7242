// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::ActivityResult;

use super::Renderable;
use super::common::write_origin_notice;

/// Terminal glyph for an activity icon key.
fn glyph(icon: &str) -> &'static str {
    match icon {
        "commit" => "↑",
        "create" => "+",
        "pull-request" => "⇄",
        "issue" => "!",
        "star" => "★",
        _ => "•",
    }
}

impl Renderable for ActivityResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style("Recent activity").bold())?;
        write_origin_notice(w, "Activity", &self.origin)?;

        if self.events.is_empty() {
            writeln!(w, "  {}", style("No recent activity").dim())?;
        }
        for event in &self.events {
            writeln!(
                w,
                "  {} {}  {}",
                style(glyph(event.icon)).cyan(),
                event.text,
                style(&event.date).dim()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}
