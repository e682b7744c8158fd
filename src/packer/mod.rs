// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

pub mod collect;
pub mod deps;
pub mod git;
pub mod gitignore;
pub mod language;
pub mod prefix;
pub mod process;
pub mod remote;
pub mod security;
pub mod sort;
pub mod walker;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::Instrument;

use crate::MergedConfig;
use crate::output::RenderInput;
use crate::utils::error::{PackError, PipelineStage};
use crate::utils::progress::ProgressCallback;

pub use deps::PackDeps;
use prefix::{PathPrefixer, RootIndex};
pub use security::{SafetyReport, SuspiciousFileResult, SuspiciousKind};

/// A file as read from disk, before any transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Root-relative, `/`-separated path
    pub path: String,
    pub content: String,
}

impl RawFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A file after text normalization; its path is the final output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    pub path: String,
    pub content: String,
}

/// Uncommitted changes of a root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitDiffResult {
    pub work_tree_diff: String,
    pub staged_diff: String,
}

impl GitDiffResult {
    pub fn is_empty(&self) -> bool {
        self.work_tree_diff.is_empty() && self.staged_diff.is_empty()
    }

    /// Concatenate per-root diffs in root order, skipping empty parts.
    pub fn merge(parts: impl IntoIterator<Item = GitDiffResult>) -> Option<Self> {
        let mut work_tree = Vec::new();
        let mut staged = Vec::new();
        let mut any = false;
        for part in parts {
            any = true;
            if !part.work_tree_diff.is_empty() {
                work_tree.push(part.work_tree_diff);
            }
            if !part.staged_diff.is_empty() {
                staged.push(part.staged_diff);
            }
        }
        any.then(|| Self {
            work_tree_diff: work_tree.join("\n"),
            staged_diff: staged.join("\n"),
        })
    }
}

/// Everything a pack run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PackResult {
    pub total_files: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    /// Keyed by final output path
    pub file_char_counts: BTreeMap<String, usize>,
    /// Keyed by final output path
    pub file_token_counts: BTreeMap<String, usize>,
    pub git_diff_token_count: usize,
    pub suspicious_files_results: Vec<SuspiciousFileResult>,
    pub suspicious_git_diff_results: Vec<SuspiciousFileResult>,
    pub processed_files: Vec<ProcessedFile>,
    pub safe_file_paths: Vec<String>,
}

/// [`PackResult`] without file bodies, for machine-readable reports.
#[derive(Debug, Clone, Serialize)]
pub struct PackSummary<'a> {
    pub total_files: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    pub file_char_counts: &'a BTreeMap<String, usize>,
    pub file_token_counts: &'a BTreeMap<String, usize>,
    pub git_diff_token_count: usize,
    pub suspicious_files_results: &'a [SuspiciousFileResult],
    pub suspicious_git_diff_results: &'a [SuspiciousFileResult],
    pub safe_file_paths: &'a [String],
}

impl PackResult {
    pub fn summary(&self) -> PackSummary<'_> {
        PackSummary {
            total_files: self.total_files,
            total_characters: self.total_characters,
            total_tokens: self.total_tokens,
            file_char_counts: &self.file_char_counts,
            file_token_counts: &self.file_token_counts,
            git_diff_token_count: self.git_diff_token_count,
            suspicious_files_results: &self.suspicious_files_results,
            suspicious_git_diff_results: &self.suspicious_git_diff_results,
            safe_file_paths: &self.safe_file_paths,
        }
    }
}

/// Pack `roots` with the default stage implementations.
pub async fn pack(
    roots: &[PathBuf],
    config: &MergedConfig,
    progress: &ProgressCallback,
) -> Result<PackResult, PackError> {
    pack_with_deps(roots, config, progress, &PackDeps::default()).await
}

/// Run a stage future and log how long it took.
async fn timed<F: Future>(label: &str, fut: F) -> F::Output {
    let start = Instant::now();
    let output = fut.await;
    tracing::debug!("{label} took {:?}", start.elapsed());
    output
}

/// Pack `roots` into one artifact using the given stage implementations.
pub async fn pack_with_deps(
    roots: &[PathBuf],
    config: &MergedConfig,
    progress: &ProgressCallback,
    deps: &PackDeps,
) -> Result<PackResult, PackError> {
    let span = tracing::info_span!("pack", roots = roots.len());
    run_pipeline(roots, config, progress, deps)
        .instrument(span)
        .await
}

async fn run_pipeline(
    roots: &[PathBuf],
    config: &MergedConfig,
    progress: &ProgressCallback,
    deps: &PackDeps,
) -> Result<PackResult, PackError> {
    progress("Searching for files...");
    let paths_by_root = timed(
        "Search files",
        try_join_all(roots.iter().map(|root| deps.searcher.search(root, config))),
    )
    .await
    .map_err(|e| e.at_stage(PipelineStage::Search))?;

    progress("Sorting files...");
    let all_paths: Vec<String> = paths_by_root.iter().flatten().cloned().collect();
    let sorted_paths = (deps.sort_paths)(all_paths);
    // Each root reads its own paths in global order; a path shared by several
    // roots appears once per root.
    let sorted_by_root: Vec<Vec<String>> = paths_by_root
        .into_iter()
        .map(|paths| (deps.sort_paths)(paths))
        .collect();

    progress("Collecting files...");
    let collect_all = timed(
        "Collect files",
        try_join_all(
            roots
                .iter()
                .zip(&sorted_by_root)
                .map(|(root, paths)| deps.collector.collect(paths, root, config, progress)),
        ),
    );
    let diff_all = async {
        if !config.output.git.include_diffs {
            return None;
        }
        progress("Getting git diffs...");
        let diffs = join_all(roots.iter().map(|root| deps.git_diffs.diff(root))).await;
        GitDiffResult::merge(diffs.into_iter().flatten())
    };
    let (collected, git_diffs) = tokio::join!(collect_all, diff_all);
    let collected = collected.map_err(|e| e.at_stage(PipelineStage::Collect))?;

    let (raw_files, root_index) = merge_collected(collected, &sorted_paths);
    let collected_count = raw_files.len();
    tracing::debug!("Collected {collected_count} files from {} roots", roots.len());

    progress("Running security check...");
    let report = timed(
        "Security check",
        deps.validator
            .validate(raw_files, git_diffs.as_ref(), config, progress),
    )
    .await;
    let SafetyReport {
        safe_files,
        safe_mask,
        safe_file_paths,
        mut suspicious_files_results,
        suspicious_git_diff_results,
        safe_git_diffs,
    } = report;
    if !suspicious_git_diff_results.is_empty() {
        tracing::warn!(
            "{} git diff section(s) flagged as suspicious and excluded from the output",
            suspicious_git_diff_results.len()
        );
    }

    progress("Processing files...");
    let mut processed_files = timed(
        "Process files",
        deps.processor.process(safe_files, config, progress),
    )
    .await
    .map_err(|e| e.at_stage(PipelineStage::Process))?;

    let mut safe_file_paths = safe_file_paths;
    let mut tree_paths = safe_file_paths.clone();
    if prefix::should_prefix(config.output.show_root_path, roots.len()) {
        let prefixer = PathPrefixer::new(&config.cwd, roots);
        let (safe_roots, suspicious_roots) = root_index.split(&safe_mask);

        let rewrite = |path: &str, assigned: Option<&usize>| match assigned {
            Some(&root) => prefixer.apply(root, path),
            None => prefixer.apply(root_index.lookup(path), path),
        };
        let use_safe = safe_roots.len() == processed_files.len();
        for (i, file) in processed_files.iter_mut().enumerate() {
            file.path = rewrite(&file.path, safe_roots.get(i).filter(|_| use_safe));
        }
        let use_safe = safe_roots.len() == safe_file_paths.len();
        for (i, path) in safe_file_paths.iter_mut().enumerate() {
            *path = rewrite(path, safe_roots.get(i).filter(|_| use_safe));
        }
        let use_suspicious = suspicious_roots.len() == suspicious_files_results.len();
        for (i, result) in suspicious_files_results.iter_mut().enumerate() {
            result.file_path = rewrite(
                &result.file_path,
                suspicious_roots.get(i).filter(|_| use_suspicious),
            );
        }
        tree_paths = (deps.sort_paths)(safe_file_paths.clone());
    }

    progress("Generating output...");
    let input = RenderInput {
        roots,
        config,
        files: &processed_files,
        tree_paths: &tree_paths,
        git_diffs: safe_git_diffs.as_ref(),
    };
    let output = timed("Generate output", deps.generator.generate(&input))
        .await
        .map_err(|e| e.at_stage(PipelineStage::Generate))?;

    progress("Writing output file...");
    timed("Write output", deps.writer.write(&output, config))
        .await
        .map_err(|e| e.at_stage(PipelineStage::Write))?;

    if config.output.copy_to_clipboard {
        progress("Copying to clipboard...");
        if let Err(e) = deps.clipboard.copy(&output, progress).await {
            tracing::warn!("Failed to copy output to clipboard: {e}");
        }
    }

    progress("Calculating metrics...");
    let metrics = timed(
        "Calculate metrics",
        deps.metrics.calculate(
            &processed_files,
            &output,
            safe_git_diffs.as_ref(),
            config,
            progress,
        ),
    )
    .await
    .map_err(|e| e.at_stage(PipelineStage::Metrics))?;

    tracing::info!(
        "Packed {} files ({} excluded as suspicious)",
        metrics.total_files,
        suspicious_files_results.len()
    );

    Ok(PackResult {
        total_files: metrics.total_files,
        total_characters: metrics.total_characters,
        total_tokens: metrics.total_tokens,
        file_char_counts: metrics.file_char_counts,
        file_token_counts: metrics.file_token_counts,
        git_diff_token_count: metrics.git_diff_token_count,
        suspicious_files_results,
        suspicious_git_diff_results,
        processed_files,
        safe_file_paths,
    })
}

/// Flatten per-root collections into global path order and record which root
/// each file came from. Ties (the same path in several roots) keep root order.
fn merge_collected(collected: Vec<Vec<RawFile>>, sorted_paths: &[String]) -> (Vec<RawFile>, RootIndex) {
    let position: HashMap<&str, usize> = sorted_paths
        .iter()
        .enumerate()
        .map(|(i, path)| (path.as_str(), i))
        .collect();

    let mut tagged: Vec<(usize, usize, RawFile)> = collected
        .into_iter()
        .enumerate()
        .flat_map(|(root, files)| files.into_iter().map(move |file| (root, file)))
        .map(|(root, file)| {
            let pos = position.get(file.path.as_str()).copied().unwrap_or(usize::MAX);
            (pos, root, file)
        })
        .collect();
    tagged.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let mut index = RootIndex::default();
    let files = tagged
        .into_iter()
        .map(|(_, root, file)| {
            index.record(&file.path, root);
            file
        })
        .collect();
    (files, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_collected_follows_global_order() {
        let sorted = vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()];
        let collected = vec![
            vec![RawFile::new("c.txt", "c"), RawFile::new("a.txt", "a")],
            vec![RawFile::new("b.txt", "b"), RawFile::new("a.txt", "a2")],
        ];

        let (files, index) = merge_collected(collected, &sorted);
        let order: Vec<(&str, &str)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.content.as_str()))
            .collect();
        assert_eq!(order, vec![("a.txt", "a"), ("a.txt", "a2"), ("b.txt", "b"), ("c.txt", "c")]);
        assert_eq!(index.assignments(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_git_diff_merge() {
        let merged = GitDiffResult::merge(vec![
            GitDiffResult {
                work_tree_diff: "diff a".to_string(),
                staged_diff: String::new(),
            },
            GitDiffResult {
                work_tree_diff: "diff b".to_string(),
                staged_diff: "staged b".to_string(),
            },
        ])
        .expect("some diff");
        assert_eq!(merged.work_tree_diff, "diff a\ndiff b");
        assert_eq!(merged.staged_diff, "staged b");

        assert!(GitDiffResult::merge(Vec::new()).is_none());
    }

    #[test]
    fn test_pack_result_summary_omits_bodies() {
        let result = PackResult {
            total_files: 1,
            total_characters: 5,
            total_tokens: 2,
            file_char_counts: BTreeMap::from([("a.txt".to_string(), 5)]),
            file_token_counts: BTreeMap::from([("a.txt".to_string(), 2)]),
            git_diff_token_count: 0,
            suspicious_files_results: Vec::new(),
            suspicious_git_diff_results: Vec::new(),
            processed_files: vec![ProcessedFile {
                path: "a.txt".to_string(),
                content: "hello".to_string(),
            }],
            safe_file_paths: vec!["a.txt".to_string()],
        };
        let json = serde_json::to_value(result.summary()).expect("serializable");
        assert_eq!(json["total_tokens"], 2);
        assert!(json.get("processed_files").is_none());
    }
}
