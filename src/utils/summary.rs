// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal report for a completed pack run.
//!
//! The report has four parts: the largest files, the security check outcome,
//! the pack totals, and a completion line.

use std::io::Write;

use anyhow::Result;
use console::{Term, style};

use crate::MergedConfig;
use crate::packer::{PackResult, SuspiciousFileResult};
use crate::utils::formatting::{format_number, format_percent};

const BRANCH: &str = "\u{251c}\u{2500}";
const LAST: &str = "\u{2514}\u{2500}";

fn branch(is_last: bool) -> &'static str {
    if is_last { LAST } else { BRANCH }
}

/// The `limit` largest files by character count, ties broken by path.
pub fn top_files(result: &PackResult, limit: usize) -> Vec<(&str, usize, usize)> {
    let mut files: Vec<(&str, usize, usize)> = result
        .file_char_counts
        .iter()
        .map(|(path, &chars)| {
            let tokens = result.file_token_counts.get(path).copied().unwrap_or(0);
            (path.as_str(), chars, tokens)
        })
        .collect();
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    files.truncate(limit);
    files
}

fn suspicious_lines(out: &mut Vec<String>, results: &[SuspiciousFileResult]) {
    for (i, item) in results.iter().enumerate() {
        out.push(format!(
            "{} {}",
            style(branch(i + 1 == results.len())).dim(),
            style(&item.file_path).yellow()
        ));
        for message in &item.messages {
            out.push(format!("     - {message}"));
        }
    }
}

/// Build the report as lines of (possibly styled) text.
pub fn render_report(result: &PackResult, config: &MergedConfig) -> Vec<String> {
    let mut out = Vec::new();

    let top = top_files(result, config.output.top_files_length);
    if !top.is_empty() {
        out.push(String::new());
        out.push(format!(
            "{}:",
            style(format!("Top {} Files by Character Count", top.len())).bold()
        ));
        for (i, (path, chars, tokens)) in top.iter().enumerate() {
            out.push(format!(
                "{} {path} ({} chars, {} tokens, {})",
                style(branch(i + 1 == top.len())).dim(),
                format_number(*chars),
                format_number(*tokens),
                format_percent(*tokens, result.total_tokens)
            ));
        }
    }

    out.push(String::new());
    out.push(format!("{}:", style("Security Check").bold()));
    if !config.enable_security_check {
        out.push(format!("{} Security check disabled", style(LAST).dim()));
    } else if result.suspicious_files_results.is_empty()
        && result.suspicious_git_diff_results.is_empty()
    {
        out.push(format!(
            "{} {}",
            style(LAST).dim(),
            style("No suspicious files detected").green()
        ));
    } else {
        if !result.suspicious_files_results.is_empty() {
            out.push(format!(
                "{} suspicious file(s) detected and excluded:",
                result.suspicious_files_results.len()
            ));
            suspicious_lines(&mut out, &result.suspicious_files_results);
        }
        if !result.suspicious_git_diff_results.is_empty() {
            out.push(format!(
                "{} suspicious git diff section(s) excluded:",
                result.suspicious_git_diff_results.len()
            ));
            suspicious_lines(&mut out, &result.suspicious_git_diff_results);
        }
        out.push("Review the listed files and remove any secrets before sharing.".to_string());
    }

    out.push(String::new());
    out.push(format!("{}:", style("Pack Summary").bold()));
    let mut rows = vec![
        ("Total Files", format_number(result.total_files)),
        ("Total Chars", format_number(result.total_characters)),
        ("Total Tokens", format_number(result.total_tokens)),
        ("Output", config.output.file_path.display().to_string()),
        (
            "Security",
            if config.enable_security_check {
                format!(
                    "{} suspicious file(s) excluded",
                    result.suspicious_files_results.len()
                )
            } else {
                "disabled".to_string()
            },
        ),
    ];
    if config.output.git.include_diffs {
        rows.push((
            "Git Diffs",
            format!("{} tokens", format_number(result.git_diff_token_count)),
        ));
    }
    for (i, (label, value)) in rows.iter().enumerate() {
        out.push(format!(
            "{} {label}: {value}",
            style(branch(i + 1 == rows.len())).dim()
        ));
    }

    out.push(String::new());
    out.push(format!(
        "{} {}",
        style("\u{2713}").green().bold(),
        style("All done! Your repository has been packed.").bold()
    ));
    out
}

/// Print the report to stdout.
///
/// # Errors
///
/// Returns an error if writing to the terminal fails.
pub fn print_report(result: &PackResult, config: &MergedConfig) -> Result<()> {
    let mut term = Term::stdout();
    for line in render_report(result, config) {
        writeln!(term, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::SuspiciousKind;
    use std::collections::BTreeMap;

    fn result() -> PackResult {
        PackResult {
            total_files: 3,
            total_characters: 60,
            total_tokens: 20,
            file_char_counts: BTreeMap::from([
                ("a.rs".to_string(), 10),
                ("b.rs".to_string(), 40),
                ("c.rs".to_string(), 10),
            ]),
            file_token_counts: BTreeMap::from([
                ("a.rs".to_string(), 4),
                ("b.rs".to_string(), 12),
                ("c.rs".to_string(), 4),
            ]),
            git_diff_token_count: 0,
            suspicious_files_results: vec![SuspiciousFileResult {
                file_path: ".env".to_string(),
                messages: vec!["AWS access key ID (aws-access-key-id)".to_string()],
                kind: SuspiciousKind::File,
            }],
            suspicious_git_diff_results: Vec::new(),
            processed_files: Vec::new(),
            safe_file_paths: vec!["a.rs".into(), "b.rs".into(), "c.rs".into()],
        }
    }

    #[test]
    fn test_top_files_order_and_limit() {
        let result = result();
        let top = top_files(&result, 2);
        assert_eq!(top, vec![("b.rs", 40, 12), ("a.rs", 10, 4)]);
        assert!(top_files(&result, 0).is_empty());
    }

    #[test]
    fn test_report_mentions_suspicious_files() {
        let lines = render_report(&result(), &MergedConfig::default());
        let report = console::strip_ansi_codes(&lines.join("\n")).into_owned();
        assert!(report.contains("1 suspicious file(s) detected and excluded:"));
        assert!(report.contains(".env"));
        assert!(report.contains("aws-access-key-id"));
        assert!(report.contains("Total Tokens: 20"));
        assert!(report.contains("b.rs (40 chars, 12 tokens, 60.0%)"));
    }

    #[test]
    fn test_report_with_security_disabled() {
        let mut config = MergedConfig::default();
        config.enable_security_check = false;
        let lines = render_report(&result(), &config);
        let report = console::strip_ansi_codes(&lines.join("\n")).into_owned();
        assert!(report.contains("Security check disabled"));
        assert!(report.contains("Security: disabled"));
    }
}
