// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::utils::error::PackError;

/// Name of the per-directory ignore file read alongside `.gitignore`.
pub const IGNORE_FILE_NAME: &str = ".repopackignore";

/// Paths that are never useful in a packed artifact.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".hg",
    ".svn",
    // Dependencies and virtual environments
    "node_modules",
    "bower_components",
    ".venv",
    "venv",
    "__pycache__",
    // Build output
    "target",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    // Editors and OS cruft
    ".idea",
    ".vscode",
    ".DS_Store",
    "Thumbs.db",
    "*.log",
    // Lockfiles
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "composer.lock",
    "Gemfile.lock",
    "poetry.lock",
    "go.sum",
    // Binary and media
    "*.pyc",
    "*.class",
    "*.jar",
    "*.o",
    "*.a",
    "*.so",
    "*.dylib",
    "*.dll",
    "*.exe",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.webp",
    "*.pdf",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.woff",
    "*.woff2",
    "*.ttf",
    "*.eot",
    "*.mp3",
    "*.mp4",
];

/// Gitignore-style matcher for the built-in and user-supplied patterns.
pub struct GitIgnorer {
    gitignore: Gitignore,
}

impl GitIgnorer {
    pub fn new<'a, P: AsRef<Path>>(
        root: P,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, PackError> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder.add_line(None, pattern).map_err(|e: ignore::Error| {
                PackError::Config(format!("Invalid ignore pattern '{pattern}': {e}"))
            })?;
        }
        let gitignore = builder
            .build()
            .map_err(|e: ignore::Error| PackError::Config(e.to_string()))?;
        Ok(Self { gitignore })
    }

    /// Matcher for `root` built from the configured pattern sources.
    pub fn from_config(
        root: &Path,
        use_default_patterns: bool,
        custom_patterns: &[String],
    ) -> Result<Self, PackError> {
        let defaults = DEFAULT_IGNORE_PATTERNS
            .iter()
            .copied()
            .filter(|_| use_default_patterns);
        let custom = custom_patterns.iter().map(String::as_str);
        Self::new(root, defaults.chain(custom))
    }

    /// `path` must lie under the matcher's root.
    pub fn is_ignored<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> bool {
        self.gitignore
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}

impl std::fmt::Debug for GitIgnorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitIgnorer")
            .field("patterns", &self.gitignore.num_ignores())
            .finish()
    }
}
