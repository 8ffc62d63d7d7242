// SPDX-License-Identifier: Apache-2.0

//! Display formatting for numbers, sizes, dates and commit messages.
//!
//! Pure functions shared by the render methods of the facade and the CLI.

use chrono::{DateTime, Utc};

/// Formats an integer with `,` as the thousands separator.
///
/// # Examples
///
/// ```
/// use forgestat_core::formatters::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats an optional count, rendering a missing value as `"0"`.
#[must_use]
pub fn format_optional_number(n: Option<u64>) -> String {
    n.map_or_else(|| "0".to_string(), format_number)
}

/// Formats a byte count as bytes, KB or MB (1024-based, one decimal).
///
/// Negative or non-finite input renders as `"0 bytes"`.
///
/// # Examples
///
/// ```
/// use forgestat_core::formatters::format_file_size;
///
/// assert_eq!(format_file_size(1023.0), "1023 bytes");
/// assert_eq!(format_file_size(1024.0), "1.0 KB");
/// assert_eq!(format_file_size(1048576.0), "1.0 MB");
/// ```
#[must_use]
pub fn format_file_size(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    if !bytes.is_finite() || bytes < 0.0 {
        return "0 bytes".to_string();
    }
    if bytes < KB {
        format!("{} bytes", bytes.trunc())
    } else if bytes < MB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / MB)
    }
}

/// Formats a timestamp as a short date, e.g. `"Jan 15, 2023"`.
#[must_use]
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// Formats a timestamp as date and 12-hour time, e.g. `"Jan 15, 2023, 12:00 PM"`.
#[must_use]
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Returns the first line of a commit message.
///
/// # Examples
///
/// ```
/// use forgestat_core::formatters::format_commit_message;
///
/// assert_eq!(format_commit_message("Fix bug\n\ndetails"), "Fix bug");
/// ```
#[must_use]
pub fn format_commit_message(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Truncates text to a maximum length with a custom suffix.
///
/// Uses character count (not byte count) to safely handle multi-byte UTF-8.
/// The suffix is included in the max length calculation.
#[must_use]
pub fn truncate_with_suffix(text: &str, max_len: usize, suffix: &str) -> String {
    let char_count = text.chars().count();
    if char_count <= max_len {
        text.to_string()
    } else {
        let suffix_len = suffix.chars().count();
        let truncate_at = max_len.saturating_sub(suffix_len);
        let truncated: String = text.chars().take(truncate_at).collect();
        format!("{truncated}{suffix}")
    }
}

/// Truncates text to a maximum length with default ellipsis suffix "...".
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    truncate_with_suffix(text, max_len, "...")
}

/// Formats a `DateTime<Utc>` as relative time (e.g., "3 days ago").
///
/// # Examples
///
/// ```
/// use chrono::{Utc, Duration};
/// use forgestat_core::formatters::format_relative_time;
///
/// let now = Utc::now();
/// assert_eq!(format_relative_time(&now), "just now");
///
/// let yesterday = now - Duration::days(1);
/// assert_eq!(format_relative_time(&yesterday), "1 day ago");
/// ```
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(*dt);

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    if duration.num_days() > 365 {
        plural(duration.num_days() / 365, "year")
    } else if duration.num_days() > 30 {
        plural(duration.num_days() / 30, "month")
    } else if duration.num_days() > 0 {
        plural(duration.num_days(), "day")
    } else if duration.num_hours() > 0 {
        plural(duration.num_hours(), "hour")
    } else {
        "just now".to_string()
    }
}

/// Parses an ISO 8601 timestamp and formats it as relative time.
///
/// Returns the original string if parsing fails.
#[must_use]
pub fn parse_and_format_relative_time(timestamp: &str) -> String {
    match timestamp.parse::<DateTime<Utc>>() {
        Ok(dt) => format_relative_time(&dt),
        Err(_) => timestamp.to_string(),
    }
}
