// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

pub mod tokenizer;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::MergedConfig;
use crate::packer::deps::MetricsCalculator;
use crate::packer::{GitDiffResult, ProcessedFile};
use crate::utils::error::PackError;
use crate::utils::progress::ProgressCallback;
use tokenizer::TokenCounter;

/// Character and token counts for a pack run.
///
/// Totals are always the sums of the per-file maps. Diff tokens are counted
/// separately and are not part of `total_tokens`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackMetrics {
    pub total_files: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    pub file_char_counts: BTreeMap<String, usize>,
    pub file_token_counts: BTreeMap<String, usize>,
    pub git_diff_token_count: usize,
}

impl PackMetrics {
    /// Count `files` and `diffs` with `counter`.
    pub fn compute(
        files: &[ProcessedFile],
        diffs: Option<&GitDiffResult>,
        counter: &TokenCounter,
    ) -> Self {
        let mut metrics = Self {
            total_files: files.len(),
            ..Self::default()
        };

        for file in files {
            let chars = file.content.chars().count();
            let tokens = counter.count(&file.content);
            // Paths can coincide when several roots are packed without prefixes.
            *metrics.file_char_counts.entry(file.path.clone()).or_default() += chars;
            *metrics.file_token_counts.entry(file.path.clone()).or_default() += tokens;
            metrics.total_characters += chars;
            metrics.total_tokens += tokens;
        }

        if let Some(diffs) = diffs {
            metrics.git_diff_token_count =
                counter.count(&diffs.work_tree_diff) + counter.count(&diffs.staged_diff);
        }

        metrics
    }
}

/// Default [`MetricsCalculator`], backed by tiktoken.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMetrics;

#[async_trait]
impl MetricsCalculator for TokenMetrics {
    async fn calculate(
        &self,
        files: &[ProcessedFile],
        output: &str,
        diffs: Option<&GitDiffResult>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<PackMetrics, PackError> {
        let counter = TokenCounter::new(&config.token_count_encoding)?;
        progress(&format!("Calculating metrics... ({} files)", files.len()));

        let files = files.to_vec();
        let diffs = diffs.cloned();
        let metrics = tokio::task::spawn_blocking(move || {
            PackMetrics::compute(&files, diffs.as_ref(), &counter)
        })
        .await
        .map_err(|e| PackError::Tokenizer(format!("Token counting task failed: {e}")))?;

        tracing::debug!(
            "Output is {} characters; {} tokens across {} files",
            output.chars().count(),
            metrics.total_tokens,
            metrics.total_files
        );
        Ok(metrics)
    }
}
