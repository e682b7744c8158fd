// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain text style. There is no escaping, so `parsable_style` has no effect.

use super::{ArtifactView, SummaryText};
use crate::packer::security::{STAGED_DIFF_LABEL, WORK_TREE_DIFF_LABEL};

const LONG_RULE: &str = "================================================================";
const SHORT_RULE: &str = "================";

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("{LONG_RULE}\n{title}\n{LONG_RULE}\n"));
}

fn summary(out: &mut String, text: &SummaryText, header_text: Option<&str>) {
    out.push_str(&format!("{}\n\n", text.intro));
    section(out, "File Summary");
    out.push_str(&format!("\nPurpose:\n--------\n{}\n\n", text.purpose));
    out.push_str(
        "File Format:\n------------\n\
         1. This summary section\n\
         2. Repository structure\n\
         3. Repository files, each consisting of:\n  \
         a. A separator line (================)\n  \
         b. The file path (File: path/to/file)\n  \
         c. Another separator line\n  \
         d. The full contents of the file\n\n",
    );
    out.push_str("Usage Guidelines:\n-----------------\n");
    for guideline in text.guidelines {
        out.push_str(&format!("- {guideline}\n"));
    }
    out.push_str("\nNotes:\n------\n");
    for note in &text.notes {
        out.push_str(&format!("- {note}\n"));
    }
    if let Some(header) = header_text {
        out.push_str(&format!("\nUser Provided Header:\n-----------------------\n{header}\n"));
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
        section(&mut out, "Directory Structure");
        out.push_str(&format!("{tree}\n\n"));
    }

    section(&mut out, "Files");
    for file in &view.files {
        out.push_str(&format!(
            "\n{SHORT_RULE}\nFile: {}\n{SHORT_RULE}\n{}\n",
            file.path, file.content
        ));
    }

    if let Some(diffs) = view.diffs {
        out.push('\n');
        section(&mut out, "Git Diffs");
        if !diffs.work_tree_diff.is_empty() {
            out.push_str(&format!(
                "{WORK_TREE_DIFF_LABEL}:\n{}\n",
                diffs.work_tree_diff.trim_end()
            ));
        }
        if !diffs.staged_diff.is_empty() {
            out.push_str(&format!(
                "{STAGED_DIFF_LABEL}:\n{}\n",
                diffs.staged_diff.trim_end()
            ));
        }
    }

    out
}
