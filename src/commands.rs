//! Command handler
//!
//! Resolves the input mode (directory tree, piped content, piped path
//! list), loads the allow list, runs the processor, and routes the report
//! to the right stream. The core never prints; everything user-facing
//! happens here.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::core::model::{ProcessResult, Report, ReportMode, STDIN_PATH};
use crate::core::processor::FileProcessor;
use crate::core::render::{self, OutputFormat};

/// Well-known allow-list file loaded when `--allow-file` is not given.
pub const DEFAULT_ALLOW_FILE: &str = ".demojify-allow";

/// Parsed options for one invocation.
#[derive(Debug, Clone)]
pub struct Options {
    /// Preview instead of rewriting (the default).
    pub dry_run: bool,

    /// Print only the paths of files containing emojis.
    pub list_only: bool,

    /// Ordered exclusion patterns.
    pub excludes: Vec<String>,

    pub format: OutputFormat,

    /// Treat stdin as a newline-separated list of file paths.
    pub files_from_stdin: bool,

    /// Suppress the report.
    pub quiet: bool,

    /// Emoji graphemes to preserve.
    pub allowed: Vec<String>,
}

/// Process the target and emit the report.
pub fn run(target: &Path, options: &Options) -> Result<()> {
    let processor = FileProcessor::with_excludes_and_allowed(
        options.excludes.clone(),
        options.allowed.clone(),
    );

    let stdin_target = target.as_os_str() == "-";
    let stdin_content = stdin_target && !options.files_from_stdin;

    if stdin_content && options.list_only {
        bail!("--list-only cannot be used with piped content (use --files-from-stdin for file lists)");
    }

    let results = if stdin_target {
        if options.files_from_stdin {
            process_paths_from_stdin(&processor, options.dry_run)?
        } else {
            process_content_from_stdin(&processor, options.dry_run)?
        }
    } else {
        if !target.exists() {
            bail!("path does not exist: {}", target.display());
        }
        processor.process_tree(target, options.dry_run)?
    };

    output_results(&results, options, stdin_content)
}

/// Load allowed emojis from a file, one grapheme per line. Lines empty
/// after trimming, or starting with `#`, are ignored.
pub fn load_allow_file(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open allow file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut allowed = Vec::new();
    for line in reader.lines() {
        let line = line
            .with_context(|| format!("failed to read allow file: {}", path.display()))?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        allowed.push(entry.to_string());
    }

    Ok(allowed)
}

/// Resolve the allow list: an explicit file if given, otherwise the
/// conventional `.demojify-allow` when present, otherwise empty.
pub fn resolve_allow_list(allow_file: Option<&Path>) -> Result<Vec<String>> {
    match allow_file {
        Some(path) => load_allow_file(path),
        None => {
            let default = Path::new(DEFAULT_ALLOW_FILE);
            if default.exists() {
                load_allow_file(default)
            } else {
                Ok(Vec::new())
            }
        }
    }
}

/// Clean piped content directly, synthesizing a single `<stdin>` result.
///
/// With `--no-dry-run` the cleaned content is emitted on stdout; the
/// report (if any) belongs on stderr.
fn process_content_from_stdin(
    processor: &FileProcessor,
    dry_run: bool,
) -> Result<Vec<ProcessResult>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("failed to read from stdin")?;

    if content.is_empty() {
        return Ok(Vec::new());
    }

    // One trailing newline belongs to the pipe, not the content.
    let content = content.strip_suffix('\n').unwrap_or(&content);

    let emojis = processor.detector().find_emojis(content);
    if emojis.is_empty() {
        return Ok(Vec::new());
    }

    let cleaned = processor.detector().remove_emojis(content);
    let result = ProcessResult::changed(
        STDIN_PATH,
        emojis,
        content.len() as u64,
        cleaned.len() as u64,
    );

    if !dry_run {
        print!("{cleaned}");
        let _ = io::stdout().flush();
    }

    Ok(vec![result])
}

/// Read file paths from stdin and process each one, warning and skipping
/// on missing or failing files instead of aborting the batch.
fn process_paths_from_stdin(
    processor: &FileProcessor,
    dry_run: bool,
) -> Result<Vec<ProcessResult>> {
    let mut results = Vec::new();

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let path = Path::new(trimmed);
        if !path.exists() {
            eprintln!("Warning: file does not exist: {}", path.display());
            continue;
        }

        match processor.process_file(path, dry_run) {
            Ok(result) if result.modified => results.push(result),
            Ok(_) => {}
            Err(err) => eprintln!("Warning: failed to process {}: {err}", path.display()),
        }
    }

    Ok(results)
}

/// Route the report: JSON always to stdout; text to stdout, except for
/// piped content where cleaned output owns stdout and the report moves to
/// stderr.
fn output_results(results: &[ProcessResult], options: &Options, stdin_content: bool) -> Result<()> {
    if options.format == OutputFormat::Json {
        let mode = if options.list_only {
            ReportMode::List
        } else {
            ReportMode::Process
        };
        let report = Report::new(results.to_vec(), options.dry_run, mode);
        let rendered = render::render_json(&report).context("failed to serialize JSON report")?;
        println!("{rendered}");
        return Ok(());
    }

    if stdin_content {
        if !options.quiet && !results.is_empty() {
            eprint!("{}", render::render_detailed(results, options.dry_run));
        }
        return Ok(());
    }

    if options.quiet && !options.list_only {
        return Ok(());
    }

    if results.is_empty() {
        if !options.list_only {
            println!("No emojis found in any files.");
        }
        return Ok(());
    }

    if options.list_only {
        print!("{}", render::render_file_list(results));
        return Ok(());
    }

    print!("{}", render::render_detailed(results, options.dry_run));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_allow_file_skips_comments_and_blanks() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("allow.txt");
        fs::write(&path, "✅\n\n# a comment\n  🚀  \n#😊\n").unwrap();

        let allowed = load_allow_file(&path).unwrap();
        assert_eq!(allowed, vec!["✅", "🚀"]);
    }

    #[test]
    fn test_load_allow_file_missing() {
        let temp = tempdir().unwrap();
        assert!(load_allow_file(&temp.path().join("nope")).is_err());
    }

    #[test]
    fn test_resolve_allow_list_explicit_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("allow.txt");
        fs::write(&path, "✅\n").unwrap();

        let allowed = resolve_allow_list(Some(&path)).unwrap();
        assert_eq!(allowed, vec!["✅"]);
    }

    #[test]
    fn test_run_rejects_missing_target() {
        let temp = tempdir().unwrap();
        let options = Options {
            dry_run: true,
            list_only: false,
            excludes: Vec::new(),
            format: OutputFormat::Text,
            files_from_stdin: false,
            quiet: true,
            allowed: Vec::new(),
        };

        let err = run(&temp.path().join("missing"), &options).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
