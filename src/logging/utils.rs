//! Utility functions for path resolution, ANSI stripping, and time formatting.
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement, erase, etc.
/// are also stripped without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Return the `$XDG_CACHE_HOME/brewfiles/` directory, creating it if needed.
pub(super) fn cache_dir() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME").map_or_else(
        |_| {
            std::env::var("HOME")
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    let dir = cache_dir.join("brewfiles");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Per-run log file path: `brewfiles-<YYYYmmdd-HHMMSS>.log` in the cache dir.
#[must_use]
pub fn log_file_path(started: DateTime<Local>) -> Option<PathBuf> {
    Some(cache_dir()?.join(log_file_name(started)))
}

fn log_file_name(started: DateTime<Local>) -> String {
    format!("brewfiles-{}.log", started.format("%Y%m%d-%H%M%S"))
}

/// Format the current local time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_datetime() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current local time as `HH:MM:SS`.
pub(super) fn format_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
