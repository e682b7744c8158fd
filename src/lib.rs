// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! # repopack
//!
//! repopack packs one or more directory trees into a single text artifact
//! suitable for feeding to a language model. The packing pipeline runs these
//! stages in order:
//!
//! 1. **Search** - discover candidate files per root (gitignore aware)
//! 2. **Sort** - establish one global, platform-independent path order
//! 3. **Collect** - read file contents, concurrently per root
//! 4. **Git diffs** - optional working-tree and staged diffs (fail-open)
//! 5. **Security** - screen files and diffs for secrets
//! 6. **Process** - strip comments and blank lines from safe files
//! 7. **Prefix** - disambiguate paths when several roots are packed
//! 8. **Generate** - render the artifact (plain, xml or markdown)
//! 9. **Write** - persist to disk and optionally copy to the clipboard
//! 10. **Metrics** - per-file character and token counts
//!
//! Every stage is replaceable through [`packer::PackDeps`], which is how the
//! pipeline is tested in isolation.
//!
//! Configuration follows hierarchical precedence:
//! 1. User config (~/.config/repopack/config.toml)
//! 2. Git root (repopack.toml)
//! 3. Current directory (repopack.toml)
//! 4. Explicit --config path
//! 5. Environment variables (REPOPACK_*)
//! 6. CLI flags (highest precedence)

pub mod cli;
pub mod metrics;
pub mod output;
pub mod packer;
pub mod utils;

use anyhow::{Context, Result};
use output::OutputStyle;
use packer::{PackResult, remote};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::progress::PackProgress;

/// Default token encoding used for metrics.
pub const DEFAULT_TOKEN_ENCODING: &str = "o200k_base";

/// Git-related output settings.
#[derive(Debug, Clone)]
pub struct GitOutputConfig {
    /// Order files by how often they changed recently (least changed first)
    pub sort_by_changes: bool,
    /// Number of commits inspected when sorting by changes
    pub sort_by_changes_max_commits: usize,
    /// Include working-tree and staged diffs in the artifact
    pub include_diffs: bool,
}

impl Default for GitOutputConfig {
    fn default() -> Self {
        Self {
            sort_by_changes: true,
            sort_by_changes_max_commits: 100,
            include_diffs: false,
        }
    }
}

/// Artifact rendering and delivery settings.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output file, relative to `cwd` unless absolute
    pub file_path: PathBuf,
    pub style: OutputStyle,
    /// Escape structural delimiters so the artifact is a well-formed document
    pub parsable_style: bool,
    /// Free text rendered into the file summary section
    pub header_text: Option<String>,
    pub file_summary: bool,
    pub directory_structure: bool,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub show_line_numbers: bool,
    pub copy_to_clipboard: bool,
    /// Number of entries in the "top files" report
    pub top_files_length: usize,
    /// Root path prefixing: `None` prefixes only when several roots are packed
    pub show_root_path: Option<bool>,
    pub git: GitOutputConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let style = OutputStyle::default();
        Self {
            file_path: style.default_file_path(),
            style,
            parsable_style: false,
            header_text: None,
            file_summary: true,
            directory_structure: true,
            remove_comments: false,
            remove_empty_lines: false,
            show_line_numbers: false,
            copy_to_clipboard: false,
            top_files_length: 5,
            show_root_path: None,
            git: GitOutputConfig::default(),
        }
    }
}

/// File exclusion settings.
#[derive(Debug, Clone)]
pub struct IgnoreConfig {
    /// Honor .gitignore files
    pub use_gitignore: bool,
    /// Apply the built-in ignore list (VCS dirs, lockfiles, build output, ...)
    pub use_default_patterns: bool,
    /// Extra gitignore-style patterns
    pub custom_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_default_patterns: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// Final resolved configuration after merging all sources (CLI, env, config files).
///
/// The pipeline treats this as read-only input.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Working directory; output paths and root prefixes are relative to it
    pub cwd: PathBuf,
    /// Directories to pack (resolved against `cwd`)
    pub directories: Vec<PathBuf>,
    /// Remote repository to clone and pack instead of `directories`
    pub remote: Option<String>,
    /// Branch, tag or commit to check out for `remote`
    pub remote_branch: Option<String>,
    pub output: OutputConfig,
    /// Include globs; empty means everything
    pub include: Vec<String>,
    pub ignore: IgnoreConfig,
    pub enable_security_check: bool,
    /// tiktoken encoding name used for token counts
    pub token_count_encoding: String,
    /// Print the pack result as JSON instead of the terminal summary
    pub json_summary: bool,
    /// Verbosity level (0-2)
    pub verbose: u8,
    /// Quiet mode (suppress all output)
    pub quiet: bool,
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            directories: vec![PathBuf::from(".")],
            remote: None,
            remote_branch: None,
            output: OutputConfig::default(),
            include: Vec::new(),
            ignore: IgnoreConfig::default(),
            enable_security_check: true,
            token_count_encoding: DEFAULT_TOKEN_ENCODING.to_string(),
            json_summary: false,
            verbose: 0,
            quiet: false,
        }
    }
}

impl MergedConfig {
    /// Default configuration rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        Self {
            directories: vec![cwd.clone()],
            cwd,
            ..Self::default()
        }
    }

    /// Absolute location of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.cwd.join(&self.output.file_path)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity-derived level. Safe to call
/// more than once; later calls are ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repopack={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run a full pack for the CLI: resolve roots (cloning a remote if asked),
/// pack, and report.
pub async fn run(config: MergedConfig) -> Result<PackResult> {
    tracing::info!("repopack v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Configuration: style={}, output={}, security={}, encoding={}",
        config.output.style,
        config.output.file_path.display(),
        config.enable_security_check,
        config.token_count_encoding
    );

    // The checkout guard keeps a cloned remote on disk until packing is done.
    let (roots, pack_config, _checkout) = if let Some(remote_spec) = &config.remote {
        let url = remote::normalize_remote_url(remote_spec);
        tracing::info!("Cloning remote repository {url}");
        let checkout = remote::clone_remote(&url, config.remote_branch.as_deref())
            .await
            .with_context(|| format!("Failed to clone remote repository {url}"))?;
        let roots = vec![checkout.root().to_path_buf()];
        (roots, checkout.pack_config(&config), Some(checkout))
    } else {
        let roots: Vec<PathBuf> = config
            .directories
            .iter()
            .map(|dir| config.cwd.join(dir))
            .collect();
        (roots, config.clone(), None)
    };

    for root in &roots {
        if !root.is_dir() {
            anyhow::bail!("Directory does not exist: {}", root.display());
        }
    }

    let progress = PackProgress::new(config.quiet || config.json_summary);
    let callback_progress = progress.clone();
    let result = packer::pack(&roots, &pack_config, &move |message: &str| {
        callback_progress.set_message(message);
    })
        .await
        .context("Failed to pack repository");
    progress.finish();
    let result = result?;

    if config.json_summary {
        let json = serde_json::to_string_pretty(&result.summary())
            .context("Failed to serialize pack result")?;
        #[allow(clippy::print_stdout)] // JSON summary is the command's output
        {
            println!("{json}");
        }
    } else if !config.quiet {
        utils::summary::print_report(&result, &config).context("Failed to print pack summary")?;
    }

    Ok(result)
}
