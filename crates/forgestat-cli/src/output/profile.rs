// SPDX-License-Identifier: Apache-2.0

use console::style;
use forgestat_core::{ProfileView, format_number};
use std::io::{self, Write};

use crate::cli::OutputContext;

use super::Renderable;

impl Renderable for ProfileView {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style(&self.name).bold())?;
        writeln!(w, "  {}", style(&self.bio).dim())?;
        writeln!(w)?;
        writeln!(
            w,
            "  {} {}   {} {}   {} {}",
            style("followers:").dim(),
            style(format_number(self.followers)).cyan(),
            style("following:").dim(),
            style(format_number(self.following)).cyan(),
            style("repositories:").dim(),
            style(format_number(self.public_repos)).cyan()
        )?;
        if let Some(location) = &self.location {
            writeln!(w, "  {} {location}", style("location:").dim())?;
        }
        if let Some(url) = &self.profile_url {
            writeln!(w, "  {} {url}", style("profile:").dim())?;
        }
        writeln!(w)?;
        Ok(())
    }
}
