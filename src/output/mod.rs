// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Artifact rendering.
//!
//! [`ArtifactGenerator`] decides what goes into the artifact (summary, tree,
//! file order, line numbers, diffs) and hands a prepared [`ArtifactView`] to
//! the renderer for the configured [`OutputStyle`].

pub mod markdown;
pub mod plain;
pub mod tree;
pub mod writer;
pub mod xml;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::MergedConfig;
use crate::packer::deps::OutputGenerator;
use crate::packer::git::{GitRunner, get_file_change_count, is_git_repository};
use crate::packer::{GitDiffResult, ProcessedFile};
use crate::utils::error::PackError;

/// Structural style of the artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Plain,
    #[default]
    Xml,
    Markdown,
}

impl OutputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Plain => "plain",
            OutputStyle::Xml => "xml",
            OutputStyle::Markdown => "markdown",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputStyle::Plain => "txt",
            OutputStyle::Xml => "xml",
            OutputStyle::Markdown => "md",
        }
    }

    /// Output file used when none is configured.
    pub fn default_file_path(&self) -> PathBuf {
        PathBuf::from(format!("repopack-output.{}", self.extension()))
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputStyle {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "txt" | "text" => Ok(OutputStyle::Plain),
            "xml" => Ok(OutputStyle::Xml),
            "markdown" | "md" => Ok(OutputStyle::Markdown),
            _ => Err(PackError::invalid_style(s)),
        }
    }
}

/// Everything the generator needs from a pack run.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub roots: &'a [PathBuf],
    pub config: &'a MergedConfig,
    /// Processed files in pack order, with final paths
    pub files: &'a [ProcessedFile],
    /// Sorted safe paths for the directory tree
    pub tree_paths: &'a [String],
    pub git_diffs: Option<&'a GitDiffResult>,
}

/// A file body ready for rendering.
#[derive(Debug, Clone)]
pub struct RenderedFile<'a> {
    pub path: &'a str,
    pub content: Cow<'a, str>,
}

/// Fixed prose of the file summary section.
#[derive(Debug, Clone)]
pub struct SummaryText {
    pub intro: String,
    pub purpose: &'static str,
    pub guidelines: &'static [&'static str],
    pub notes: Vec<String>,
}

/// Prepared artifact contents, shared by all renderers.
#[derive(Debug, Clone)]
pub struct ArtifactView<'a> {
    pub header_text: Option<&'a str>,
    pub summary: Option<SummaryText>,
    pub tree: Option<String>,
    pub files: Vec<RenderedFile<'a>>,
    pub diffs: Option<&'a GitDiffResult>,
    pub parsable: bool,
}

const PURPOSE: &str = "This file contains a packed representation of the repository's contents. \
It is designed to be easily consumable by AI systems for analysis, code review, \
or other automated processes.";

const GUIDELINES: &[&str] = &[
    "This file should be treated as read-only. Any changes should be made to the original repository files, not this packed version.",
    "When processing this file, use the file path to distinguish between different files in the repository.",
    "Be aware that this file may contain sensitive information. Handle it with the same level of security as you would the original repository.",
];

fn summary_text(config: &MergedConfig) -> SummaryText {
    let output = &config.output;
    let mut notes = vec![
        "Some files may have been excluded based on .gitignore rules and repopack's configuration.".to_string(),
        "Binary files are not included in this packed representation.".to_string(),
    ];
    if !config.include.is_empty() {
        notes.push(format!(
            "Only files matching these patterns are included: {}",
            config.include.join(", ")
        ));
    }
    if !config.ignore.custom_patterns.is_empty() {
        notes.push(format!(
            "Files matching these patterns are excluded: {}",
            config.ignore.custom_patterns.join(", ")
        ));
    }
    if config.enable_security_check {
        notes.push("Files flagged by the security check have been excluded.".to_string());
    }
    if output.remove_comments {
        notes.push("Code comments have been removed from supported file types.".to_string());
    }
    if output.remove_empty_lines {
        notes.push("Empty lines have been removed from all files.".to_string());
    }
    if output.show_line_numbers {
        notes.push("Line numbers have been added to the beginning of each line.".to_string());
    }
    if output.git.sort_by_changes {
        notes.push("Files are sorted by Git change count (files with more changes are at the bottom).".to_string());
    }
    if output.git.include_diffs {
        notes.push("Git diffs of uncommitted changes are included at the end of the file.".to_string());
    }

    SummaryText {
        intro: "This file is a merged representation of the entire codebase, combined into a single document by repopack.".to_string(),
        purpose: PURPOSE,
        guidelines: GUIDELINES,
        notes,
    }
}

/// Prefix each line with its 1-based number, right-aligned.
pub fn add_line_numbers(content: &str) -> String {
    let count = content.lines().count();
    let width = count.max(1).to_string().len();
    content
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stable reorder so rarely changed files come first.
fn sort_by_change_count<'a>(
    files: &'a [ProcessedFile],
    counts: &std::collections::HashMap<String, usize>,
) -> Vec<&'a ProcessedFile> {
    let mut ordered: Vec<&ProcessedFile> = files.iter().collect();
    ordered.sort_by_key(|file| counts.get(&file.path).copied().unwrap_or(0));
    ordered
}

/// Default [`OutputGenerator`].
#[derive(Clone)]
pub struct ArtifactGenerator {
    runner: Arc<dyn GitRunner>,
}

impl ArtifactGenerator {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }

    async fn ordered_files<'a>(
        &self,
        input: &RenderInput<'a>,
    ) -> Vec<&'a ProcessedFile> {
        let git = &input.config.output.git;
        let first_root = input.roots.first().map(PathBuf::as_path);
        if let Some(root) = first_root.filter(|_| git.sort_by_changes)
            && is_git_repository(self.runner.as_ref(), root).await
        {
            let counts =
                get_file_change_count(self.runner.as_ref(), root, git.sort_by_changes_max_commits)
                    .await;
            return sort_by_change_count(input.files, &counts);
        }
        input.files.iter().collect()
    }

    /// Assemble the view for `input`, with files in the given order.
    pub fn view<'a>(input: &RenderInput<'a>, files: Vec<&'a ProcessedFile>) -> ArtifactView<'a> {
        let output = &input.config.output;
        let files = files
            .into_iter()
            .map(|file| RenderedFile {
                path: &file.path,
                content: if output.show_line_numbers {
                    Cow::Owned(add_line_numbers(&file.content))
                } else {
                    Cow::Borrowed(file.content.as_str())
                },
            })
            .collect();

        ArtifactView {
            header_text: output.header_text.as_deref().filter(|h| !h.trim().is_empty()),
            summary: output.file_summary.then(|| summary_text(input.config)),
            tree: output
                .directory_structure
                .then(|| tree::render_tree(input.tree_paths)),
            files,
            diffs: input.git_diffs.filter(|d| !d.is_empty()),
            parsable: output.parsable_style,
        }
    }
}

impl fmt::Debug for ArtifactGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactGenerator").finish_non_exhaustive()
    }
}

#[async_trait]
impl OutputGenerator for ArtifactGenerator {
    async fn generate(&self, input: &RenderInput<'_>) -> Result<String, PackError> {
        let files = self.ordered_files(input).await;
        let view = Self::view(input, files);
        let rendered = match input.config.output.style {
            OutputStyle::Plain => plain::render(&view),
            OutputStyle::Xml => xml::render(&view),
            OutputStyle::Markdown => markdown::render(&view),
        };
        tracing::debug!(
            "Rendered {} style artifact ({} bytes)",
            input.config.output.style,
            rendered.len()
        );
        Ok(rendered)
    }
}

/// Language hint for a fenced code block, from the file extension.
pub fn fence_language(path: &str) -> &str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "rb" => "ruby",
        "sh" | "bash" => "bash",
        "yml" | "yaml" => "yaml",
        "md" => "markdown",
        "h" => "c",
        "hpp" | "cc" | "cxx" => "cpp",
        "cs" => "csharp",
        "kt" => "kotlin",
        other => other,
    }
}
