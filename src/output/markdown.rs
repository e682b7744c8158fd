// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown style. Parsable mode picks a fence longer than any backtick run
//! in the fenced text, so bodies containing fences cannot break out.

use super::{ArtifactView, SummaryText, fence_language};
use crate::packer::security::{STAGED_DIFF_LABEL, WORK_TREE_DIFF_LABEL};

const MIN_FENCE: usize = 3;

/// Backtick fence for `content`.
pub fn fence_for(content: &str, parsable: bool) -> String {
    if !parsable {
        return "`".repeat(MIN_FENCE);
    }
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(MIN_FENCE))
}

fn fenced(out: &mut String, lang: &str, content: &str, parsable: bool) {
    let fence = fence_for(content, parsable);
    out.push_str(&format!("{fence}{lang}\n{content}\n{fence}\n"));
}

fn summary(out: &mut String, text: &SummaryText, header_text: Option<&str>) {
    out.push_str(&format!("{}\n\n# File Summary\n\n", text.intro));
    out.push_str(&format!("## Purpose\n{}\n\n", text.purpose));
    out.push_str(
        "## File Format\n\
         The content is organized as follows:\n\
         1. This summary section\n\
         2. Repository information\n\
         3. Directory structure\n\
         4. Multiple file entries, each consisting of:\n  \
         a. A header with the file path (## File: path/to/file)\n  \
         b. The full contents of the file in a code block\n\n",
    );
    out.push_str("## Usage Guidelines\n");
    for guideline in text.guidelines {
        out.push_str(&format!("- {guideline}\n"));
    }
    out.push_str("\n## Notes\n");
    for note in &text.notes {
        out.push_str(&format!("- {note}\n"));
    }
    if let Some(header) = header_text {
        out.push_str(&format!("\n## User Provided Header\n{header}\n"));
    }
    out.push('\n');
}

pub fn render(view: &ArtifactView<'_>) -> String {
    let mut out = String::new();

    if let Some(text) = &view.summary {
        summary(&mut out, text, view.header_text);
    } else if let Some(header) = view.header_text {
        out.push_str(&format!("{header}\n\n"));
    }

    if let Some(tree) = &view.tree {
        out.push_str("# Directory Structure\n");
        fenced(&mut out, "", tree, view.parsable);
        out.push('\n');
    }

    out.push_str("# Files\n");
    for file in &view.files {
        out.push_str(&format!("\n## File: {}\n", file.path));
        fenced(&mut out, fence_language(file.path), &file.content, view.parsable);
    }

    if let Some(diffs) = view.diffs {
        out.push_str("\n# Git Diffs\n");
        if !diffs.work_tree_diff.is_empty() {
            out.push_str(&format!("## {WORK_TREE_DIFF_LABEL}\n"));
            fenced(&mut out, "diff", diffs.work_tree_diff.trim_end(), view.parsable);
        }
        if !diffs.staged_diff.is_empty() {
            out.push_str(&format!("\n## {STAGED_DIFF_LABEL}\n"));
            fenced(&mut out, "diff", diffs.staged_diff.trim_end(), view.parsable);
        }
    }

    out
}
