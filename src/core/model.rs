//! Processing result model
//!
//! Every processing mode (tree walk, single file, piped content) produces
//! `ProcessResult` values; renderers consume them unchanged. The error
//! taxonomy distinguishes read, write, and walk failures so callers can
//! decide whether to abort or warn-and-continue.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// File identifier used for results synthesized from piped content.
pub const STDIN_PATH: &str = "<stdin>";

/// Outcome of processing a single file (or piped content).
///
/// Invariant: `modified` is true exactly when `emojis_found` is non-empty,
/// and `new_size` is `Some` exactly when `modified` is true. In dry-run
/// mode `new_size` reports what the rewrite *would* produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Path of the processed file, or `<stdin>` for piped content.
    pub file_path: String,

    /// Distinct emojis found, in order of first appearance.
    pub emojis_found: Vec<String>,

    /// Byte length of the original content.
    pub original_size: u64,

    /// Byte length of the cleaned content; present only when modified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_size: Option<u64>,

    /// Whether emoji removal changes (or changed) the content.
    pub modified: bool,
}

impl ProcessResult {
    /// Create a result for content with no removable emojis.
    pub fn clean(path: impl Into<String>, original_size: u64) -> Self {
        Self {
            file_path: path.into(),
            emojis_found: Vec::new(),
            original_size,
            new_size: None,
            modified: false,
        }
    }

    /// Create a result for content whose cleaned form differs from the
    /// original.
    pub fn changed(
        path: impl Into<String>,
        emojis_found: Vec<String>,
        original_size: u64,
        new_size: u64,
    ) -> Self {
        Self {
            file_path: path.into(),
            emojis_found,
            original_size,
            new_size: Some(new_size),
            modified: true,
        }
    }
}

/// Failure while reading or rewriting one file.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The file could not be opened or read.
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The cleaned content or its permission bits could not be written.
    #[error("failed to write cleaned file {path}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Failure while walking a directory tree.
///
/// The walk is all-or-nothing: the first file that fails aborts it, and
/// files rewritten before the failure stay rewritten.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A directory entry could not be visited.
    #[error("failed to traverse directory tree")]
    Traverse(#[from] walkdir::Error),

    /// Processing one file aborted the walk.
    #[error("failed to process {path}")]
    File {
        path: String,
        #[source]
        source: ProcessError,
    },
}

/// Mode tag in the JSON report summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Files were only listed, not rewritten or previewed in detail.
    List,
    /// Files were processed (previewed or rewritten).
    Process,
}

/// Summary block of the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of files with at least one emoji.
    pub total_files: usize,

    /// Distinct emoji count summed across files.
    pub total_emojis: usize,

    /// Whether the run was a preview.
    pub dry_run: bool,

    pub mode: ReportMode,
}

/// Complete JSON report: summary plus the per-file results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub files: Vec<ProcessResult>,
}

impl Report {
    /// Build a report from processing results.
    pub fn new(files: Vec<ProcessResult>, dry_run: bool, mode: ReportMode) -> Self {
        let total_emojis = files.iter().map(|r| r.emojis_found.len()).sum();
        Self {
            summary: Summary {
                total_files: files.len(),
                total_emojis,
                dry_run,
                mode,
            },
            files,
        }
    }
}
