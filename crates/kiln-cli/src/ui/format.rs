//! Formatting for sizes and artifact status lines.

use crate::dev::{ArtifactStatus, FileStatus};
use owo_colors::OwoColorize;

/// Format a byte count in the most appropriate unit (B, KB, MB, GB).
///
/// # Examples
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// One board line for an artifact: time, name, gzipped size, status.
pub fn format_status_line(file: &FileStatus) -> String {
    let size = if file.size > 0 {
        format_size(file.size)
    } else {
        "-".to_string()
    };

    let status = match file.status {
        ArtifactStatus::Done => file.status.as_str().green().to_string(),
        ArtifactStatus::Pending => file.status.as_str().dimmed().to_string(),
    };

    format!(
        "{} {:<16} {:>10} gz  {}",
        file.timestamp.dimmed(),
        file.name,
        size,
        status
    )
}
