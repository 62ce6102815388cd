//! CLI module - Command-line interface definition and dispatch

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::commands::{self, Options};
use crate::core::render::OutputFormat;

/// demojify - find and remove emojis from text files.
#[derive(Parser, Debug)]
#[command(name = "demojify")]
#[command(
    author,
    version,
    about,
    long_about = r#"demojify searches through files and removes every emoji it finds.

By default it runs in dry-run mode to preview changes; pass --no-dry-run
to actually modify files. Rewritten files are restricted to owner-only
read/write permission.

Use '-' as the target to clean piped content directly, or combine it with
--files-from-stdin to read a newline-separated list of file paths.

Examples:
    # Preview emoji removal from the current directory (dry-run)
    demojify .

    # Actually remove emojis from a project
    demojify --no-dry-run /path/to/project

    # Only list files containing emojis
    demojify -l /path/to/project

    # Clean piped content
    cat file.txt | demojify -

    # Process file paths from stdin
    find . -name "*.txt" | demojify - --files-from-stdin

    # Exclude directories and patterns
    demojify . --exclude node_modules --exclude "*.test.js"

    # JSON report
    demojify . --output json
"#
)]
pub struct Cli {
    /// Directory or file to process, or '-' for stdin.
    #[arg(
        value_name = "TARGET",
        long_help = "Directory or file to process. Pass '-' to read from stdin:\n\
content is cleaned directly, or, with --files-from-stdin, each line is\n\
treated as a file path to process."
    )]
    pub target: PathBuf,

    /// Actually modify files instead of previewing.
    #[arg(
        long,
        long_help = "Actually rewrite files in place instead of previewing.\n\n\
Without this flag no file is ever written. Rewritten files are left with\n\
mode 0600 regardless of their previous permissions."
    )]
    pub no_dry_run: bool,

    /// Only list files containing emojis, one per line.
    #[arg(short = 'l', long)]
    pub list_only: bool,

    /// Exclude files or directories matching this pattern (repeatable).
    #[arg(
        long = "exclude",
        value_name = "PATTERN",
        long_help = "Exclude files or directories matching this pattern. May be repeated.\n\n\
A pattern matches by exact path, by path segment (a directory or file\n\
name anywhere in the tree), by absolute-path prefix, or as a glob\n\
('*'/'?') against the full path or the basename. An excluded directory\n\
is pruned entirely."
    )]
    pub exclude: Vec<String>,

    /// Output format (text/json).
    #[arg(
        short = 'o',
        long,
        default_value = "text",
        value_parser = ["text", "json"],
        value_name = "FORMAT",
        long_help = "Select the report format.\n\n\
Supported values:\n\
- text (default): human-readable report\n\
- json: a document with a summary block and a per-file array"
    )]
    pub output: String,

    /// Read file paths from stdin instead of processing stdin content.
    #[arg(
        long,
        long_help = "With TARGET '-', treat stdin as a newline-separated list of file\n\
paths. Missing or unreadable paths produce a warning on stderr and are\n\
skipped; the rest of the list is still processed."
    )]
    pub files_from_stdin: bool,

    /// Suppress processing reports (stdin mode still emits cleaned content).
    #[arg(short, long)]
    pub quiet: bool,

    /// File containing allowed emojis, one per line.
    #[arg(
        short = 'a',
        long,
        value_name = "FILE",
        long_help = "File containing emojis to preserve, one per line. Blank lines and\n\
lines starting with '#' are ignored.\n\n\
When omitted, .demojify-allow in the current directory is loaded if it\n\
exists."
    )]
    pub allow_file: Option<PathBuf>,

    /// Disable colored output.
    #[arg(
        long,
        long_help = "Disable colored output. This is useful when piping to files or when\n\
your terminal does not support ANSI colors."
    )]
    pub no_color: bool,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    // The value_parser restricts output to the supported formats.
    let format: OutputFormat = cli.output.parse().unwrap_or_default();
    let allowed = commands::resolve_allow_list(cli.allow_file.as_deref())?;

    let options = Options {
        dry_run: !cli.no_dry_run,
        list_only: cli.list_only,
        excludes: cli.exclude,
        format,
        files_from_stdin: cli.files_from_stdin,
        quiet: cli.quiet,
        allowed,
    };

    commands::run(&cli.target, &options)
}
