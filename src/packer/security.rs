// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Pattern-based secret screening.
//!
//! Files and diffs are matched against a fixed rule library. A file with any
//! match is excluded from the artifact and reported; a matching diff part is
//! blanked. Screening never fails a run: if the scan task dies, everything is
//! treated as safe and a warning is logged.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use super::deps::SafetyValidator;
use super::{GitDiffResult, RawFile};
use crate::MergedConfig;
use crate::utils::progress::ProgressCallback;

/// Label used for a suspicious working-tree diff.
pub const WORK_TREE_DIFF_LABEL: &str = "Working tree changes";
/// Label used for a suspicious staged diff.
pub const STAGED_DIFF_LABEL: &str = "Staged changes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousKind {
    File,
    GitDiff,
}

/// One file or diff that failed screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousFileResult {
    pub file_path: String,
    /// Distinct reasons, in rule order. Never contains the matched text.
    pub messages: Vec<String>,
    pub kind: SuspiciousKind,
}

/// Outcome of screening.
#[derive(Debug, Clone, Default)]
pub struct SafetyReport {
    pub safe_files: Vec<RawFile>,
    /// One entry per input file, `true` when the file was kept
    pub safe_mask: Vec<bool>,
    pub safe_file_paths: Vec<String>,
    pub suspicious_files_results: Vec<SuspiciousFileResult>,
    pub suspicious_git_diff_results: Vec<SuspiciousFileResult>,
    /// Input diffs with suspicious parts blanked; `None` if nothing is left
    pub safe_git_diffs: Option<GitDiffResult>,
}

impl SafetyReport {
    /// Report that keeps every file and diff.
    pub fn all_safe(files: Vec<RawFile>, diffs: Option<&GitDiffResult>) -> Self {
        Self {
            safe_mask: vec![true; files.len()],
            safe_file_paths: files.iter().map(|f| f.path.clone()).collect(),
            safe_files: files,
            suspicious_files_results: Vec::new(),
            suspicious_git_diff_results: Vec::new(),
            safe_git_diffs: diffs.filter(|d| !d.is_empty()).cloned(),
        }
    }
}

struct SecretRule {
    id: &'static str,
    description: &'static str,
    pattern: &'static str,
}

const RULES: &[SecretRule] = &[
    SecretRule {
        id: "aws-access-key-id",
        description: "AWS access key ID",
        pattern: r"\b(?:AKIA|ASIA|ABIA|ACCA)[0-9A-Z]{16}\b",
    },
    SecretRule {
        id: "aws-secret-access-key",
        description: "AWS secret access key",
        pattern: r#"(?i)aws_?secret_?(?:access_?)?key\s*[:=]\s*["']?[A-Za-z0-9/+=]{40}"#,
    },
    SecretRule {
        id: "private-key",
        description: "Private key block",
        pattern: r"-----BEGIN[ A-Z0-9_-]{0,100}PRIVATE KEY( BLOCK)?-----",
    },
    SecretRule {
        id: "github-token",
        description: "GitHub token",
        pattern: r"\b(?:ghp|gho|ghu|ghs|ghr)_[A-Za-z0-9]{36,255}\b",
    },
    SecretRule {
        id: "github-fine-grained-pat",
        description: "GitHub fine-grained personal access token",
        pattern: r"\bgithub_pat_[A-Za-z0-9_]{22,255}",
    },
    SecretRule {
        id: "slack-token",
        description: "Slack token",
        pattern: r"\bxox[baprs]-[0-9A-Za-z-]{10,}",
    },
    SecretRule {
        id: "slack-webhook",
        description: "Slack incoming webhook URL",
        pattern: r"https://hooks\.slack\.com/services/T[A-Z0-9]+/B[A-Z0-9]+/[A-Za-z0-9]+",
    },
    SecretRule {
        id: "gcp-api-key",
        description: "Google API key",
        pattern: r"\bAIza[0-9A-Za-z_-]{35}",
    },
    SecretRule {
        id: "stripe-live-key",
        description: "Stripe live secret key",
        pattern: r"\b(?:sk|rk)_live_[0-9a-zA-Z]{24,}",
    },
    SecretRule {
        id: "openai-api-key",
        description: "OpenAI API key",
        pattern: r"\bsk-(?:proj-)?[A-Za-z0-9_-]{20,}T3BlbkFJ[A-Za-z0-9_-]{20,}",
    },
    SecretRule {
        id: "anthropic-api-key",
        description: "Anthropic API key",
        pattern: r"\bsk-ant-(?:api|admin)\d{2}-[A-Za-z0-9_-]{80,}",
    },
    SecretRule {
        id: "npm-token",
        description: "npm access token",
        pattern: r"\bnpm_[A-Za-z0-9]{36}\b",
    },
    SecretRule {
        id: "sendgrid-api-key",
        description: "SendGrid API key",
        pattern: r"\bSG\.[A-Za-z0-9_-]{22}\.[A-Za-z0-9_-]{43}",
    },
    SecretRule {
        id: "connection-string-credentials",
        description: "Database connection string with credentials",
        pattern: r"(?i)\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqps?)://[^\s:/@]+:[^\s:/@]+@",
    },
    SecretRule {
        id: "basic-auth-url",
        description: "URL with embedded credentials",
        pattern: r"(?i)\bhttps?://[^\s:/@]+:[^\s:/@]+@[^\s/]+",
    },
    SecretRule {
        id: "generic-credential",
        description: "Hard-coded credential assignment",
        pattern: r#"(?i)\b[a-z0-9_]*(?:password|passwd|secret|api_?key|access_?token|auth_?token)\s*[:=]\s*["'][^"'\s]{12,}["']"#,
    },
];

static COMPILED_RULES: LazyLock<Vec<(&'static SecretRule, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(re) => Some((rule, re)),
            Err(e) => {
                tracing::warn!("Skipping invalid security rule {}: {e}", rule.id);
                None
            }
        })
        .collect()
});

/// Reasons `content` looks sensitive; empty when it is safe.
pub fn scan_content(content: &str) -> Vec<String> {
    COMPILED_RULES
        .iter()
        .filter(|(_, re)| re.is_match(content))
        .map(|(rule, _)| format!("{} ({})", rule.description, rule.id))
        .collect()
}

struct ScanOutcome {
    file_messages: Vec<Vec<String>>,
    work_tree_messages: Vec<String>,
    staged_messages: Vec<String>,
}

fn scan_all(files: &[RawFile], diffs: Option<&GitDiffResult>) -> ScanOutcome {
    let file_messages = files.iter().map(|f| scan_content(&f.content)).collect();
    let (work_tree_messages, staged_messages) = diffs
        .map(|d| (scan_content(&d.work_tree_diff), scan_content(&d.staged_diff)))
        .unwrap_or_default();
    ScanOutcome {
        file_messages,
        work_tree_messages,
        staged_messages,
    }
}

/// Default [`SafetyValidator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityValidator;

#[async_trait]
impl SafetyValidator for SecurityValidator {
    async fn validate(
        &self,
        files: Vec<RawFile>,
        diffs: Option<&GitDiffResult>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> SafetyReport {
        if !config.enable_security_check {
            tracing::debug!("Security check disabled; all files treated as safe");
            return SafetyReport::all_safe(files, diffs);
        }

        progress(&format!("Running security check... ({} files)", files.len()));
        let shared = Arc::new(files);
        let task_files = Arc::clone(&shared);
        let task_diffs = diffs.cloned();
        let scanned = tokio::task::spawn_blocking(move || {
            scan_all(&task_files, task_diffs.as_ref())
        })
        .await;
        let files = Arc::try_unwrap(shared).unwrap_or_else(|arc| (*arc).clone());

        match scanned {
            Ok(outcome) => build_report(files, diffs, outcome),
            Err(e) => {
                tracing::warn!("Security check failed, treating all content as safe: {e}");
                SafetyReport::all_safe(files, diffs)
            }
        }
    }
}

fn build_report(
    files: Vec<RawFile>,
    diffs: Option<&GitDiffResult>,
    outcome: ScanOutcome,
) -> SafetyReport {
    let mut report = SafetyReport::default();

    for (file, messages) in files.into_iter().zip(outcome.file_messages) {
        if messages.is_empty() {
            report.safe_mask.push(true);
            report.safe_file_paths.push(file.path.clone());
            report.safe_files.push(file);
        } else {
            tracing::debug!("Excluding suspicious file {}", file.path);
            report.safe_mask.push(false);
            report.suspicious_files_results.push(SuspiciousFileResult {
                file_path: file.path,
                messages,
                kind: SuspiciousKind::File,
            });
        }
    }

    if let Some(diffs) = diffs {
        let mut safe = diffs.clone();
        if !outcome.work_tree_messages.is_empty() {
            safe.work_tree_diff.clear();
            report.suspicious_git_diff_results.push(SuspiciousFileResult {
                file_path: WORK_TREE_DIFF_LABEL.to_string(),
                messages: outcome.work_tree_messages,
                kind: SuspiciousKind::GitDiff,
            });
        }
        if !outcome.staged_messages.is_empty() {
            safe.staged_diff.clear();
            report.suspicious_git_diff_results.push(SuspiciousFileResult {
                file_path: STAGED_DIFF_LABEL.to_string(),
                messages: outcome.staged_messages,
                kind: SuspiciousKind::GitDiff,
            });
        }
        report.safe_git_diffs = (!safe.is_empty()).then_some(safe);
    }

    report
}
