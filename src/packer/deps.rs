// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Replaceable pipeline stages.
//!
//! Each stage of [`pack_with_deps`](super::pack_with_deps) is reached through a
//! trait object held by [`PackDeps`]. `PackDeps::default()` wires the real
//! implementations; tests swap individual stages with the `with_*` builders.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::collect::DiskCollector;
use super::git::{GitCli, GitDiffProvider, GitRunner};
use super::process::TextProcessor;
use super::security::{SafetyReport, SecurityValidator};
use super::walker::GlobSearcher;
use super::{GitDiffResult, ProcessedFile, RawFile, sort};
use crate::MergedConfig;
use crate::metrics::{PackMetrics, TokenMetrics};
use crate::output::writer::{DiskWriter, SystemClipboard};
use crate::output::{ArtifactGenerator, RenderInput};
use crate::utils::error::PackError;
use crate::utils::progress::ProgressCallback;

/// Discovers candidate files under one root.
#[async_trait]
pub trait FileSearcher: Send + Sync {
    /// Root-relative, `/`-separated paths in any order.
    async fn search(&self, root: &Path, config: &MergedConfig) -> Result<Vec<String>, PackError>;
}

/// Reads file contents for one root.
#[async_trait]
pub trait FileCollector: Send + Sync {
    /// Files that cannot be read as text are skipped, not reported as errors.
    async fn collect(
        &self,
        paths: &[String],
        root: &Path,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<Vec<RawFile>, PackError>;
}

/// Retrieves git diff context for one root. Fail-open: `None` means no diff.
#[async_trait]
pub trait GitDiffSource: Send + Sync {
    async fn diff(&self, root: &Path) -> Option<GitDiffResult>;
}

/// Screens files and diffs for sensitive content. Must not fail.
#[async_trait]
pub trait SafetyValidator: Send + Sync {
    async fn validate(
        &self,
        files: Vec<RawFile>,
        diffs: Option<&GitDiffResult>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> SafetyReport;
}

/// Normalizes safe file text.
#[async_trait]
pub trait FileProcessor: Send + Sync {
    async fn process(
        &self,
        files: Vec<RawFile>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<Vec<ProcessedFile>, PackError>;
}

/// Renders the artifact.
#[async_trait]
pub trait OutputGenerator: Send + Sync {
    async fn generate(&self, input: &RenderInput<'_>) -> Result<String, PackError>;
}

/// Persists the artifact.
#[async_trait]
pub trait OutputWriter: Send + Sync {
    async fn write(&self, output: &str, config: &MergedConfig) -> Result<(), PackError>;
}

/// Copies the artifact to the system clipboard.
#[async_trait]
pub trait ClipboardCopier: Send + Sync {
    async fn copy(&self, output: &str, progress: &ProgressCallback) -> Result<(), PackError>;
}

/// Computes character and token counts.
#[async_trait]
pub trait MetricsCalculator: Send + Sync {
    async fn calculate(
        &self,
        files: &[ProcessedFile],
        output: &str,
        diffs: Option<&GitDiffResult>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<PackMetrics, PackError>;
}

/// Total order used for paths; see [`sort::sort_paths`].
pub type PathSortFn = fn(Vec<String>) -> Vec<String>;

/// The bundle of stage implementations used by the packer.
#[derive(Clone)]
pub struct PackDeps {
    pub searcher: Arc<dyn FileSearcher>,
    pub collector: Arc<dyn FileCollector>,
    pub git_diffs: Arc<dyn GitDiffSource>,
    pub validator: Arc<dyn SafetyValidator>,
    pub processor: Arc<dyn FileProcessor>,
    pub generator: Arc<dyn OutputGenerator>,
    pub writer: Arc<dyn OutputWriter>,
    pub clipboard: Arc<dyn ClipboardCopier>,
    pub metrics: Arc<dyn MetricsCalculator>,
    pub sort_paths: PathSortFn,
}

impl Default for PackDeps {
    fn default() -> Self {
        let git: Arc<dyn GitRunner> = Arc::new(GitCli);
        Self {
            searcher: Arc::new(GlobSearcher),
            collector: Arc::new(DiskCollector::default()),
            git_diffs: Arc::new(GitDiffProvider::new(Arc::clone(&git))),
            validator: Arc::new(SecurityValidator),
            processor: Arc::new(TextProcessor),
            generator: Arc::new(ArtifactGenerator::new(git)),
            writer: Arc::new(DiskWriter),
            clipboard: Arc::new(SystemClipboard),
            metrics: Arc::new(TokenMetrics),
            sort_paths: sort::sort_paths,
        }
    }
}

impl PackDeps {
    pub fn with_searcher(mut self, searcher: impl FileSearcher + 'static) -> Self {
        self.searcher = Arc::new(searcher);
        self
    }

    pub fn with_collector(mut self, collector: impl FileCollector + 'static) -> Self {
        self.collector = Arc::new(collector);
        self
    }

    pub fn with_git_diffs(mut self, git_diffs: impl GitDiffSource + 'static) -> Self {
        self.git_diffs = Arc::new(git_diffs);
        self
    }

    pub fn with_validator(mut self, validator: impl SafetyValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_processor(mut self, processor: impl FileProcessor + 'static) -> Self {
        self.processor = Arc::new(processor);
        self
    }

    pub fn with_generator(mut self, generator: impl OutputGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    pub fn with_writer(mut self, writer: impl OutputWriter + 'static) -> Self {
        self.writer = Arc::new(writer);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl ClipboardCopier + 'static) -> Self {
        self.clipboard = Arc::new(clipboard);
        self
    }

    pub fn with_metrics(mut self, metrics: impl MetricsCalculator + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    pub fn with_sort_paths(mut self, sort_paths: PathSortFn) -> Self {
        self.sort_paths = sort_paths;
        self
    }
}

impl std::fmt::Debug for PackDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackDeps").finish_non_exhaustive()
    }
}

