// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use super::deps::FileSearcher;
use super::gitignore::{GitIgnorer, IGNORE_FILE_NAME};
use super::sort::normalize_separators;
use crate::MergedConfig;
use crate::utils::error::PackError;

/// Build a GlobSet from a list of patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet, PackError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::Glob::new(pattern).map_err(|e| {
            PackError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| PackError::Config(format!("Failed to build glob set: {}", e)))
}

/// Everything a blocking walk needs, detached from the borrowed config.
struct WalkOptions {
    root: PathBuf,
    include: Vec<String>,
    use_gitignore: bool,
    use_default_patterns: bool,
    custom_patterns: Vec<String>,
    output_path: PathBuf,
}

impl WalkOptions {
    fn new(root: &Path, config: &MergedConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            include: config.include.clone(),
            use_gitignore: config.ignore.use_gitignore,
            use_default_patterns: config.ignore.use_default_patterns,
            custom_patterns: config.ignore.custom_patterns.clone(),
            output_path: config.output_path(),
        }
    }
}

/// Walk `options.root` and return root-relative, `/`-separated file paths.
fn scan_files(options: WalkOptions) -> Result<Vec<String>, PackError> {
    let include_set = build_globset(&options.include)?;
    let ignorer = GitIgnorer::from_config(
        &options.root,
        options.use_default_patterns,
        &options.custom_patterns,
    )?;
    let output_path = options.output_path;

    let walker = WalkBuilder::new(&options.root)
        .hidden(false)
        .ignore(false)
        .git_ignore(options.use_gitignore)
        .git_global(options.use_gitignore)
        .git_exclude(options.use_gitignore)
        .parents(options.use_gitignore)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .follow_links(false)
        .max_depth(None)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            // The root itself is never filtered.
            entry.depth() == 0
                || !(ignorer.is_ignored(entry.path(), is_dir) || entry.path() == output_path)
        })
        .build();

    let mut paths = Vec::new();

    for result in walker {
        match result {
            Ok(entry) => {
                // Skip directories
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }

                let path = entry.path();
                let Ok(relative) = path.strip_prefix(&options.root) else {
                    tracing::warn!("Skipping path outside root: {}", path.display());
                    continue;
                };
                let relative = normalize_separators(&relative.to_string_lossy());

                // Check include patterns: if set is non-empty, require a match
                if !options.include.is_empty() && !include_set.is_match(&relative) {
                    continue;
                }

                paths.push(relative);
            }
            Err(e) => {
                tracing::warn!("Error walking directory: {}", e);
                continue;
            }
        }
    }

    tracing::debug!("Found {} files under {}", paths.len(), options.root.display());
    Ok(paths)
}

/// Default [`FileSearcher`], built on `ignore`'s parallel-safe walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobSearcher;

#[async_trait]
impl FileSearcher for GlobSearcher {
    async fn search(&self, root: &Path, config: &MergedConfig) -> Result<Vec<String>, PackError> {
        let options = WalkOptions::new(root, config);
        tokio::task::spawn_blocking(move || scan_files(options))
            .await
            .map_err(|e| PackError::FileSystem(std::io::Error::other(e)))?
    }
}
