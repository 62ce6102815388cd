//! Report rendering
//!
//! Renders processing results as a human-readable text report, a bare file
//! list, or a JSON document with a summary block. The caller picks the
//! stream; rendering never writes directly.

use colored::Colorize;
use std::fmt::Write as _;

use crate::core::model::{ProcessResult, Report};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {} (must be 'text' or 'json')", s)),
        }
    }
}

/// Render the JSON report document, pretty-printed.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Render just the file paths, one per line (for --list-only).
pub fn render_file_list(results: &[ProcessResult]) -> String {
    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "{}", result.file_path);
    }
    out
}

/// Render the detailed text report with per-file emoji lists, size
/// changes, and totals.
pub fn render_detailed(results: &[ProcessResult], dry_run: bool) -> String {
    let mut out = String::new();

    if dry_run {
        let _ = writeln!(
            out,
            "{} Found emojis in {} file(s):\n",
            "DRY RUN:".yellow().bold(),
            results.len()
        );
    } else {
        let _ = writeln!(
            out,
            "Processed {} file(s) and removed emojis:\n",
            results.len()
        );
    }

    let mut total_emojis = 0;
    for result in results {
        let _ = writeln!(out, "File: {}", result.file_path);
        let _ = writeln!(out, "  Emojis found: [{}]", result.emojis_found.join(" "));
        total_emojis += result.emojis_found.len();

        if let Some(new_size) = result.new_size {
            if dry_run {
                let _ = writeln!(
                    out,
                    "  Would reduce size: {} → {} bytes",
                    result.original_size, new_size
                );
            } else {
                let _ = writeln!(
                    out,
                    "  Size changed: {} → {} bytes",
                    result.original_size, new_size
                );
            }
        }
        let _ = writeln!(out);
    }

    if dry_run {
        let _ = writeln!(
            out,
            "Total: Would remove {} emoji(s) from {} file(s)",
            total_emojis,
            results.len()
        );
        let _ = writeln!(out, "Run with --no-dry-run to actually remove emojis.");
    } else {
        let _ = writeln!(
            out,
            "Total: Removed {} emoji(s) from {} file(s)",
            total_emojis,
            results.len()
        );
    }

    out
}
