// SPDX-License-Identifier: Apache-2.0

//! Common UX helper functions for consistent display patterns across commands.

use console::style;
use forgestat_core::{DataOrigin, ItemFailure};
use std::io::{self, Write};

/// Width of the horizontal bars in text charts.
pub const BAR_WIDTH: usize = 30;

/// Horizontal bar proportional to `value / max`.
///
/// Non-zero values always get at least one cell.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if !(value.is_finite() && max.is_finite()) || value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round().max(1.0) as usize;
    "█".repeat(cells.min(width))
}

/// Writes a yellow notice when `origin` is a substitute.
pub fn write_origin_notice<W: Write + ?Sized>(
    w: &mut W,
    what: &str,
    origin: &DataOrigin,
) -> io::Result<()> {
    if let DataOrigin::Fallback { reason } = origin {
        writeln!(
            w,
            "{}",
            style(format!("{what} unavailable, showing placeholder data ({reason})")).yellow()
        )?;
    }
    Ok(())
}

/// Writes the skipped repositories of a tally.
///
/// Verbose mode lists each repository with its reason; otherwise only the count.
pub fn write_skipped<W: Write + ?Sized>(
    w: &mut W,
    skipped: &[ItemFailure],
    verbose: bool,
) -> io::Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }
    writeln!(
        w,
        "{}",
        style(format!("{} repositories skipped", skipped.len())).yellow()
    )?;
    if verbose {
        for failure in skipped {
            writeln!(w, "  {} {}", style(&failure.item).cyan(), style(&failure.reason).dim())?;
        }
    }
    Ok(())
}
