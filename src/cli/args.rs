// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputStyle;

/// CLI argument parsing with environment variable support.
///
/// Environment variables follow the pattern `REPOPACK_*` and are overridden by CLI flags.
/// Example: `REPOPACK_STYLE=markdown` is overridden by `--style plain`.
///
/// Value options are `Option`s and switches only ever turn a setting on, so a
/// flag that was not given never overrides a config file value.
#[derive(Parser, Debug, Default)]
#[command(name = "repopack")]
#[command(about = "Pack a repository into a single AI-friendly file")]
#[command(version)]
pub struct Args {
    /// Directories to pack
    #[arg(default_value = ".")]
    pub directories: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long, env = "REPOPACK_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output style
    #[arg(long, value_enum, env = "REPOPACK_STYLE")]
    pub style: Option<OutputStyle>,

    /// Escape content so the output is a well-formed document of its style
    #[arg(long, env = "REPOPACK_PARSABLE_STYLE")]
    pub parsable_style: bool,

    /// Text to include in the file summary section
    #[arg(long, env = "REPOPACK_HEADER_TEXT")]
    pub header_text: Option<String>,

    /// Omit the file summary section
    #[arg(long)]
    pub no_file_summary: bool,

    /// Omit the directory structure section
    #[arg(long)]
    pub no_directory_structure: bool,

    /// Strip comments from supported languages
    #[arg(long, env = "REPOPACK_REMOVE_COMMENTS")]
    pub remove_comments: bool,

    /// Remove blank lines from file contents
    #[arg(long, env = "REPOPACK_REMOVE_EMPTY_LINES")]
    pub remove_empty_lines: bool,

    /// Prefix each line of file contents with its line number
    #[arg(long)]
    pub output_show_line_numbers: bool,

    /// Copy the generated output to the system clipboard
    #[arg(long)]
    pub copy: bool,

    /// Number of largest files listed in the summary
    #[arg(long, env = "REPOPACK_TOP_FILES_LEN")]
    pub top_files_len: Option<usize>,

    /// Always prefix file paths with their root directory
    #[arg(long, conflicts_with = "no_root_path")]
    pub include_root_path: bool,

    /// Never prefix file paths with their root directory
    #[arg(long)]
    pub no_root_path: bool,

    /// Include working tree and staged git diffs
    #[arg(long, env = "REPOPACK_INCLUDE_DIFFS")]
    pub include_diffs: bool,

    /// Keep path order instead of ordering files by git change frequency
    #[arg(long)]
    pub no_sort_by_changes: bool,

    /// Include only matching files, comma-separated globs
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Additional ignore patterns, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Do not honor .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,

    /// Do not apply the built-in ignore patterns
    #[arg(long)]
    pub no_default_patterns: bool,

    /// Skip screening files for secrets
    #[arg(long)]
    pub no_security_check: bool,

    /// tiktoken encoding used for token counts
    #[arg(long, env = "REPOPACK_TOKEN_COUNT_ENCODING")]
    pub token_count_encoding: Option<String>,

    /// Clone and pack a remote repository (URL or owner/repo)
    #[arg(long, env = "REPOPACK_REMOTE")]
    pub remote: Option<String>,

    /// Branch, tag or commit of the remote repository
    #[arg(long, requires = "remote")]
    pub remote_branch: Option<String>,

    /// Config file path
    #[arg(short, long, env = "REPOPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write a default repopack.toml to the current directory and exit
    #[arg(long)]
    pub init: bool,

    /// Print the pack result as JSON instead of the summary
    #[arg(long)]
    pub json_summary: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Root path prefixing requested on the command line, if any.
    pub fn show_root_path(&self) -> Option<bool> {
        if self.include_root_path {
            Some(true)
        } else if self.no_root_path {
            Some(false)
        } else {
            None
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
