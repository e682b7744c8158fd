// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management using the `config` crate for hierarchical discovery and merging.
//!
//! ## Configuration Sources (in precedence order, highest to lowest):
//! 1. **CLI flags** - Highest precedence (applied by [`merge_config`])
//! 2. **Environment variables** - `REPOPACK__<SECTION>__<KEY>`, e.g. `REPOPACK__OUTPUT__STYLE`
//! 3. **Config files** - Lowest precedence
//!
//! ## Config File Discovery (in merge order, later overrides earlier):
//! 1. `~/.config/repopack/config.toml` (user config directory)
//! 2. `repopack.toml` in the git repository root
//! 3. `repopack.toml` in the current directory
//! 4. Explicit `--config` path
//!
//! ## Usage:
//! ```no_run
//! use repopack::cli::{args, config};
//!
//! let args = args::parse();
//! let file_config = config::load(&args)?;
//! let merged = config::merge_config(&args, file_config, std::env::current_dir()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::cli::args::Args;
use crate::metrics::tokenizer::SUPPORTED_ENCODINGS;
use crate::output::OutputStyle;
use crate::utils::error::PackError;
use crate::{GitOutputConfig, IgnoreConfig, MergedConfig, OutputConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-level config file.
pub const CONFIG_FILE_NAME: &str = "repopack.toml";

/// Root configuration structure loaded from config files.
///
/// Every value is optional so that each layer only overrides what it sets.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub include: IncludeSection,
    #[serde(default)]
    pub ignore: IgnoreSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub token_count: TokenCountSection,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputSection {
    pub file_path: Option<PathBuf>,
    pub style: Option<String>,
    pub parsable_style: Option<bool>,
    pub header_text: Option<String>,
    pub file_summary: Option<bool>,
    pub directory_structure: Option<bool>,
    pub remove_comments: Option<bool>,
    pub remove_empty_lines: Option<bool>,
    pub show_line_numbers: Option<bool>,
    pub copy_to_clipboard: Option<bool>,
    pub top_files_length: Option<usize>,
    pub show_root_path: Option<bool>,
    #[serde(default)]
    pub git: GitSection,
}

/// `[output.git]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GitSection {
    pub sort_by_changes: Option<bool>,
    pub sort_by_changes_max_commits: Option<usize>,
    pub include_diffs: Option<bool>,
}

/// File inclusion patterns.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IncludeSection {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// File exclusion settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IgnoreSection {
    pub use_gitignore: Option<bool>,
    pub use_default_patterns: Option<bool>,
    #[serde(default)]
    pub custom_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SecuritySection {
    pub enable_security_check: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenCountSection {
    pub encoding: Option<String>,
}

impl FileConfig {
    /// A config with every value spelled out at its default, as written by `--init`.
    pub fn with_defaults() -> Self {
        let defaults = MergedConfig::default();
        let output = &defaults.output;
        Self {
            output: OutputSection {
                file_path: Some(output.file_path.clone()),
                style: Some(output.style.as_str().to_string()),
                parsable_style: Some(output.parsable_style),
                header_text: None,
                file_summary: Some(output.file_summary),
                directory_structure: Some(output.directory_structure),
                remove_comments: Some(output.remove_comments),
                remove_empty_lines: Some(output.remove_empty_lines),
                show_line_numbers: Some(output.show_line_numbers),
                copy_to_clipboard: Some(output.copy_to_clipboard),
                top_files_length: Some(output.top_files_length),
                show_root_path: None,
                git: GitSection {
                    sort_by_changes: Some(output.git.sort_by_changes),
                    sort_by_changes_max_commits: Some(output.git.sort_by_changes_max_commits),
                    include_diffs: Some(output.git.include_diffs),
                },
            },
            include: IncludeSection::default(),
            ignore: IgnoreSection {
                use_gitignore: Some(defaults.ignore.use_gitignore),
                use_default_patterns: Some(defaults.ignore.use_default_patterns),
                custom_patterns: Vec::new(),
            },
            security: SecuritySection {
                enable_security_check: Some(defaults.enable_security_check),
            },
            token_count: TokenCountSection {
                encoding: Some(defaults.token_count_encoding),
            },
        }
    }
}

fn discover_config_paths(cwd: &Path, explicit_path: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // User config (lowest precedence)
    if let Some(user_config) = get_user_config_path() {
        paths.push(user_config);
    }

    // Git root config
    let current_dir_config = cwd.join(CONFIG_FILE_NAME);
    if let Some(git_root) = find_git_root(cwd) {
        let git_config = git_root.join(CONFIG_FILE_NAME);
        if git_config.exists() && git_config != current_dir_config {
            paths.push(git_config);
        }
    }

    // Current directory config
    if current_dir_config.exists() {
        paths.push(current_dir_config);
    }

    // Explicit --config path (highest precedence)
    if let Some(explicit) = explicit_path {
        paths.push(cwd.join(explicit));
    }

    paths
}

fn find_git_root(cwd: &Path) -> Option<PathBuf> {
    git2::Repository::discover(cwd)
        .ok()
        .and_then(|repo| repo.workdir().map(Path::to_path_buf))
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("repopack").join("config.toml"))
        .filter(|path| path.exists())
}

/// Load configuration from discovered config files and environment variables.
pub fn load(args: &Args) -> Result<FileConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_from(args, &cwd)
}

/// [`load`] with an explicit working directory.
///
/// An explicit `--config` path that does not exist is an error; discovered
/// files are only used when present.
pub fn load_from(args: &Args, cwd: &Path) -> Result<FileConfig> {
    if let Some(explicit) = &args.config {
        let path = cwd.join(explicit);
        if !path.is_file() {
            anyhow::bail!(PackError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }

    let mut builder = config::Config::builder();
    for config_path in discover_config_paths(cwd, args.config.as_deref()) {
        tracing::debug!("Loading config file {}", config_path.display());
        builder = builder.add_source(config::File::from(config_path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("REPOPACK")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build().context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Merge file/env configuration with CLI arguments into the pipeline's [`MergedConfig`].
///
/// CLI values win whenever they were given.
pub fn merge_config(
    args: &Args,
    file: FileConfig,
    cwd: impl Into<PathBuf>,
) -> Result<MergedConfig, PackError> {
    let defaults = MergedConfig::new(cwd);
    let FileConfig {
        output: file_output,
        include,
        ignore,
        security,
        token_count,
    } = file;

    let style = match (args.style, file_output.style.as_deref()) {
        (Some(style), _) => style,
        (None, Some(name)) => name.parse::<OutputStyle>()?,
        (None, None) => defaults.output.style,
    };
    let file_path = args
        .output
        .clone()
        .or(file_output.file_path)
        .unwrap_or_else(|| style.default_file_path());

    let base = OutputConfig::default();
    let git_base = GitOutputConfig::default();
    let output = OutputConfig {
        file_path,
        style,
        parsable_style: args.parsable_style
            || file_output.parsable_style.unwrap_or(base.parsable_style),
        header_text: args.header_text.clone().or(file_output.header_text),
        file_summary: !args.no_file_summary
            && file_output.file_summary.unwrap_or(base.file_summary),
        directory_structure: !args.no_directory_structure
            && file_output
                .directory_structure
                .unwrap_or(base.directory_structure),
        remove_comments: args.remove_comments
            || file_output.remove_comments.unwrap_or(base.remove_comments),
        remove_empty_lines: args.remove_empty_lines
            || file_output
                .remove_empty_lines
                .unwrap_or(base.remove_empty_lines),
        show_line_numbers: args.output_show_line_numbers
            || file_output
                .show_line_numbers
                .unwrap_or(base.show_line_numbers),
        copy_to_clipboard: args.copy
            || file_output
                .copy_to_clipboard
                .unwrap_or(base.copy_to_clipboard),
        top_files_length: args
            .top_files_len
            .or(file_output.top_files_length)
            .unwrap_or(base.top_files_length),
        show_root_path: args.show_root_path().or(file_output.show_root_path),
        git: GitOutputConfig {
            sort_by_changes: !args.no_sort_by_changes
                && file_output
                    .git
                    .sort_by_changes
                    .unwrap_or(git_base.sort_by_changes),
            sort_by_changes_max_commits: file_output
                .git
                .sort_by_changes_max_commits
                .unwrap_or(git_base.sort_by_changes_max_commits),
            include_diffs: args.include_diffs
                || file_output.git.include_diffs.unwrap_or(git_base.include_diffs),
        },
    };

    let ignore_base = IgnoreConfig::default();
    let mut custom_patterns = ignore.custom_patterns;
    custom_patterns.extend(args.ignore.iter().cloned());

    let token_count_encoding = args
        .token_count_encoding
        .clone()
        .or(token_count.encoding)
        .unwrap_or(defaults.token_count_encoding);
    if !SUPPORTED_ENCODINGS.contains(&token_count_encoding.as_str()) {
        return Err(PackError::invalid_encoding(&token_count_encoding));
    }

    Ok(MergedConfig {
        directories: args.directories.clone(),
        remote: args.remote.clone(),
        remote_branch: args.remote_branch.clone(),
        output,
        include: if args.include.is_empty() {
            include.patterns
        } else {
            args.include.clone()
        },
        ignore: IgnoreConfig {
            use_gitignore: !args.no_gitignore
                && ignore.use_gitignore.unwrap_or(ignore_base.use_gitignore),
            use_default_patterns: !args.no_default_patterns
                && ignore
                    .use_default_patterns
                    .unwrap_or(ignore_base.use_default_patterns),
            custom_patterns,
        },
        enable_security_check: !args.no_security_check
            && security
                .enable_security_check
                .unwrap_or(defaults.enable_security_check),
        token_count_encoding,
        json_summary: args.json_summary,
        verbose: args.verbose,
        quiet: args.quiet,
        cwd: defaults.cwd,
    })
}

/// Write a default `repopack.toml` to `path`.
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<(), PackError> {
    if path.exists() {
        return Err(PackError::Config(format!(
            "{} already exists; remove it first to regenerate",
            path.display()
        )));
    }
    let content = toml::to_string_pretty(&FileConfig::with_defaults())?;
    std::fs::write(path, content)?;
    tracing::info!("Wrote default configuration to {}", path.display());
    Ok(())
}
