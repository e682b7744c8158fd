// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! XML-tagged style.
//!
//! By default file bodies are embedded verbatim between tags, which reads well
//! but is not well-formed XML. In parsable mode every text node and attribute
//! is escaped and the whole artifact is wrapped in a `<repopack>` root.

use std::borrow::Cow;

use quick_xml::escape::escape;

use super::{ArtifactView, SummaryText};

const FILE_FORMAT: &str = "The content is organized as follows:\n\
1. This summary section\n\
2. Repository information\n\
3. Directory structure\n\
4. Repository files, each consisting of:\n  \
- File path as an attribute\n  \
- Full contents of the file";

struct XmlOut {
    out: String,
    parsable: bool,
}

impl XmlOut {
    fn text<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.parsable { escape(s) } else { Cow::Borrowed(s) }
    }

    fn element(&mut self, tag: &str, body: &str) {
        let body = self.text(body).into_owned();
        self.out.push_str(&format!("<{tag}>\n{body}\n</{tag}>\n"));
    }

    fn summary(&mut self, text: &SummaryText, header_text: Option<&str>) {
        self.out.push_str("<file_summary>\n");
        self.out
            .push_str("This section contains a summary of this file.\n\n");
        self.element("purpose", text.purpose);
        self.out.push('\n');
        self.element("file_format", FILE_FORMAT);
        self.out.push('\n');
        let guidelines = bullet_list(text.guidelines.iter().copied());
        self.element("usage_guidelines", &guidelines);
        self.out.push('\n');
        let notes = bullet_list(text.notes.iter().map(String::as_str));
        self.element("notes", &notes);
        if let Some(header) = header_text {
            self.out.push('\n');
            self.element("user_provided_header", header);
        }
        self.out.push_str("</file_summary>\n\n");
    }
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n")
}

pub fn render(view: &ArtifactView<'_>) -> String {
    let mut xml = XmlOut {
        out: String::new(),
        parsable: view.parsable,
    };

    if view.parsable {
        xml.out.push_str("<repopack>\n");
    }

    if let Some(text) = &view.summary {
        let intro = xml.text(&text.intro).into_owned();
        xml.out.push_str(&format!("{intro}\n\n"));
        xml.summary(text, view.header_text);
    } else if let Some(header) = view.header_text {
        xml.element("user_provided_header", header);
        xml.out.push('\n');
    }

    if let Some(tree) = &view.tree {
        xml.element("directory_structure", tree);
        xml.out.push('\n');
    }

    xml.out.push_str("<files>\n");
    xml.out
        .push_str("This section contains the contents of the repository's files.\n\n");
    for file in &view.files {
        let path = xml.text(file.path).into_owned();
        let content = xml.text(&file.content).into_owned();
        xml.out
            .push_str(&format!("<file path=\"{path}\">\n{content}\n</file>\n\n"));
    }
    xml.out.push_str("</files>\n");

    if let Some(diffs) = view.diffs {
        xml.out.push_str("\n<git_diffs>\n");
        if !diffs.work_tree_diff.is_empty() {
            xml.element("git_diff_work_tree", diffs.work_tree_diff.trim_end());
        }
        if !diffs.staged_diff.is_empty() {
            xml.element("git_diff_staged", diffs.staged_diff.trim_end());
        }
        xml.out.push_str("</git_diffs>\n");
    }

    if view.parsable {
        xml.out.push_str("</repopack>\n");
    }
    xml.out
}
