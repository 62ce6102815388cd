//! demojify - Find and remove emojis from text files
//!
//! demojify provides:
//! - Per-code-point emoji detection over fixed Unicode ranges
//! - An allow list for emojis that must survive cleaning
//! - Recursive directory processing with exclusion patterns
//! - Dry-run previews, stdin pipelines, and text/json reports

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod core;

fn main() -> Result<()> {
    // Check for unsupported platforms
    #[cfg(windows)]
    {
        eprintln!("Error: Windows is not supported. Please use WSL (not guaranteed to work).");
        std::process::exit(1);
    }

    let cli = cli::Cli::parse();
    cli::run(cli)
}
