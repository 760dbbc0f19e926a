//! CLI module for cleansearch.
//!
//! Helpers for the command-line interface: path expansion for the config
//! flag and plain-text rendering of search outcomes.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::client::Notification;
use crate::types::SearchResult;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.cleansearch/config.json";

/// Expand tilde (~) in paths.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Render a result list for the terminal.
pub fn render_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = String::new();

    if results.is_empty() {
        let _ = writeln!(out, "No results found for \"{}\"", query);
        let _ = writeln!(out, "Try different keywords");
        return out;
    }

    let _ = writeln!(out, "About {} results", results.len());
    for result in results {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", result.title);
        let host = result.display_host();
        if !host.is_empty() {
            let _ = writeln!(out, "  {}", host);
        }
        if !result.url.is_empty() {
            let _ = writeln!(out, "  {}", result.url);
        }
        let _ = writeln!(out, "  {}", result.content);
    }
    out
}

/// Render a failure notification for the terminal, stamped with its UTC time.
pub fn render_notification(notification: &Notification) -> String {
    format!(
        "[{}] {}: {}",
        notification.at.format("%H:%M:%S"),
        notification.title,
        notification.description
    )
}
