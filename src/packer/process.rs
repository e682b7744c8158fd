// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Text normalization for safe files.
//!
//! Comment stripping is a small per-language state machine that knows about
//! string literals, so comment markers inside strings survive. Files whose
//! extension is not recognized pass through untouched apart from the final
//! whitespace trim.

use std::path::Path;

use async_trait::async_trait;

use super::deps::FileProcessor;
use super::language::{CommentSyntax, detect_language};
use super::{ProcessedFile, RawFile};
use crate::MergedConfig;
use crate::utils::error::PackError;
use crate::utils::progress::ProgressCallback;

/// How often per-file progress is reported.
const PROGRESS_INTERVAL: usize = 50;

/// Default [`FileProcessor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextProcessor;

#[async_trait]
impl FileProcessor for TextProcessor {
    async fn process(
        &self,
        files: Vec<RawFile>,
        config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<Vec<ProcessedFile>, PackError> {
        let total = files.len();
        let processed = files
            .into_iter()
            .enumerate()
            .map(|(i, file)| {
                if (i + 1) % PROGRESS_INTERVAL == 0 {
                    progress(&format!("Processing files... ({}/{total})", i + 1));
                }
                let content = process_content(
                    &file.path,
                    &file.content,
                    config.output.remove_comments,
                    config.output.remove_empty_lines,
                );
                ProcessedFile {
                    path: file.path,
                    content,
                }
            })
            .collect();
        Ok(processed)
    }
}

/// Apply the configured transforms to one file's text.
pub fn process_content(
    path: &str,
    content: &str,
    remove_comments: bool,
    remove_empty_lines: bool,
) -> String {
    let mut text = content.to_string();

    if remove_comments && let Some(language) = detect_language(Path::new(path)) {
        text = strip_comments(&text, language.comment_syntax());
    }
    if remove_empty_lines {
        text = remove_blank_lines(&text);
    }

    text.trim_start_matches(['\n', '\r']).trim_end().to_string()
}

#[derive(Clone, Copy)]
enum State {
    Code,
    Quoted(char),
    LineComment,
    BlockComment(&'static str),
}

/// Remove comments described by `syntax`, keeping string literals intact.
///
/// Newlines inside block comments are kept so line structure survives. A
/// leading `#!` line is always preserved.
pub fn strip_comments(source: &str, syntax: CommentSyntax) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    if rest.starts_with("#!") {
        let end = rest.find('\n').map_or(rest.len(), |i| i + 1);
        out.push_str(&rest[..end]);
        rest = &rest[end..];
    }

    let mut state = State::Code;
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match state {
            State::Code => {
                let tail = &rest[i..];
                if let Some((open, close)) = syntax.block
                    && tail.starts_with(open)
                {
                    skip_chars(&mut chars, open.chars().count() - 1);
                    state = State::BlockComment(close);
                } else if syntax.line.iter().any(|marker| tail.starts_with(marker)) {
                    let trimmed = out.trim_end_matches([' ', '\t']).len();
                    out.truncate(trimmed);
                    state = State::LineComment;
                } else if c == '\''
                    && syntax.char_literals
                    && let Some(len) = char_literal_len(tail)
                {
                    out.push_str(&tail[..len]);
                    skip_chars(&mut chars, tail[..len].chars().count() - 1);
                } else {
                    if syntax.quotes.contains(&c) {
                        state = State::Quoted(c);
                    }
                    out.push(c);
                }
            }
            State::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = State::Code;
                }
            }
            State::BlockComment(close) => {
                if rest[i..].starts_with(close) {
                    skip_chars(&mut chars, close.chars().count() - 1);
                    state = State::Code;
                    // A comment between two tokens still separates them, so
                    // `-/* c */-` must not become a `--` marker.
                    let next = rest[i + close.len()..].chars().next();
                    let prev = out.chars().next_back();
                    if next.is_some_and(|n| !n.is_whitespace())
                        && prev.is_some_and(|p| !p.is_whitespace())
                    {
                        out.push(' ');
                    }
                } else if c == '\n' {
                    out.push(c);
                }
            }
        }
    }

    out
}

/// Byte length of a character literal at the start of `tail` (`'x'`, `'\n'`,
/// `'\u{1F600}'`), or `None` when the `'` starts a lifetime or label.
fn char_literal_len(tail: &str) -> Option<usize> {
    let mut chars = tail.char_indices().skip(1);
    let (_, first) = chars.next()?;
    if first == '\\' {
        chars.next()?;
        // Longest escape is `\u{10FFFF}`
        chars
            .take(9)
            .find(|&(_, c)| c == '\'')
            .map(|(i, _)| i + 1)
    } else if first == '\n' {
        None
    } else {
        match chars.next() {
            Some((i, '\'')) => Some(i + 1),
            _ => None,
        }
    }
}

fn skip_chars(chars: &mut impl Iterator<Item = (usize, char)>, n: usize) {
    for _ in 0..n {
        chars.next();
    }
}

/// Drop lines that are empty or whitespace only.
pub fn remove_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::language::Language;

    #[test]
    fn test_strip_line_and_block_comments() {
        let source = "fn main() { // entry\n    /* setup */ let x = 1;\n}\n";
        let stripped = strip_comments(source, Language::Rust.comment_syntax());
        assert_eq!(stripped, "fn main() {\n     let x = 1;\n}\n");
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let source = "const url = \"http://example.com\"; // link\n";
        let stripped = strip_comments(source, Language::JavaScript.comment_syntax());
        assert_eq!(stripped, "const url = \"http://example.com\";\n");
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let source = "s = \"a \\\" # b\"  # real\n";
        let stripped = strip_comments(source, Language::Python.comment_syntax());
        assert_eq!(stripped, "s = \"a \\\" # b\"\n");
    }

    #[test]
    fn test_block_comment_keeps_line_count() {
        let source = "a\n/* one\ntwo\nthree */\nb\n";
        let stripped = strip_comments(source, Language::C.comment_syntax());
        assert_eq!(stripped.lines().count(), source.lines().count());
    }

    #[test]
    fn test_shebang_is_preserved() {
        let source = "#!/usr/bin/env bash\n# comment\necho hi # trailing\n";
        let stripped = strip_comments(source, Language::Shell.comment_syntax());
        assert_eq!(stripped, "#!/usr/bin/env bash\n\necho hi\n");
    }

    #[test]
    fn test_html_comments() {
        let source = "<p>don't</p><!-- hidden -->\n";
        let stripped = strip_comments(source, Language::Html.comment_syntax());
        assert_eq!(stripped, "<p>don't</p>\n");
    }

    #[test]
    fn test_rust_lifetimes_do_not_open_strings() {
        let source = "fn f<'a>(x: &'a str) {} // done\n";
        let stripped = strip_comments(source, Language::Rust.comment_syntax());
        assert_eq!(stripped, "fn f<'a>(x: &'a str) {}\n");
    }

    #[test]
    fn test_rust_char_literals_do_not_open_strings() {
        let source = "let q = '\"'; let u = \"http://x\"; // note\nfn f() {}\n";
        let stripped = strip_comments(source, Language::Rust.comment_syntax());
        assert_eq!(stripped, "let q = '\"'; let u = \"http://x\";\nfn f() {}\n");

        let source = "let a = '\\''; let b = '\\u{1F600}'; let s = \"//\"; // c\n";
        let stripped = strip_comments(source, Language::Rust.comment_syntax());
        assert_eq!(stripped, "let a = '\\''; let b = '\\u{1F600}'; let s = \"//\";\n");
    }

    #[test]
    fn test_char_literal_len() {
        assert_eq!(char_literal_len("'x' rest"), Some(3));
        assert_eq!(char_literal_len("'\"'"), Some(3));
        assert_eq!(char_literal_len("'\\n'"), Some(4));
        assert_eq!(char_literal_len("'\\''"), Some(4));
        assert_eq!(char_literal_len("'é'"), Some(4));
        assert_eq!(char_literal_len("'a>(x: &'a str)"), None);
        assert_eq!(char_literal_len("'static str"), None);
        assert_eq!(char_literal_len("'"), None);
    }

    #[test]
    fn test_block_comment_between_tokens_leaves_a_space() {
        let sql = Language::Sql.comment_syntax();
        assert_eq!(strip_comments("SELECT 1 -/* c */- 1;", sql), "SELECT 1 - - 1;");
        assert_eq!(strip_comments("a /* c */ b", sql), "a  b");
        assert_eq!(strip_comments("/* c */b", sql), "b");
    }

    #[test]
    fn test_remove_blank_lines() {
        assert_eq!(remove_blank_lines("a\n\n  \n\tb\n"), "a\n\tb");
    }

    #[test]
    fn test_unknown_extension_passes_through() {
        let content = "// not code\n\nplain text";
        assert_eq!(process_content("notes.txt", content, true, false), content);
    }

    #[test]
    fn test_process_content_is_idempotent() {
        let cases = [
            ("src/lib.rs", "\n\n// header\nuse std::io; // io\n\n/* block\n */\nfn a() {}\n\n"),
            ("app.py", "#!/usr/bin/env python\n# c\nx = '#not'  # yes\n\n\ny = 2\n"),
            ("index.html", "<!-- a -->\n<div>\n\n</div>\n"),
            ("data.txt", "keep   \n\n\nthis\n"),
            ("q.sql", "SELECT 1 -/* c */- 1 AS x;\n"),
            ("page.html", "<p>a<!-<!-- x -->- b --></p>"),
            ("c.rs", "let q = '\"'; let u = \"http://x\"; // c\nfn f<'a>() {}\n"),
            ("d.js", "a/* x */// y\nb/* x *//z/\n"),
        ];
        for (path, content) in cases {
            for (comments, empty) in [(true, true), (true, false), (false, true), (false, false)] {
                let once = process_content(path, content, comments, empty);
                let twice = process_content(path, &once, comments, empty);
                assert_eq!(once, twice, "{path} comments={comments} empty={empty}");
            }
        }
    }

    #[tokio::test]
    async fn test_text_processor_respects_flags() {
        let mut config = MergedConfig::default();
        config.output.remove_comments = true;
        config.output.remove_empty_lines = true;

        let files = vec![RawFile::new("a.rs", "// c\n\nfn a() {}\n")];
        let processed = TextProcessor
            .process(files, &config, &|_: &str| {})
            .await
            .expect("process");
        assert_eq!(processed[0].content, "fn a() {}");
        assert_eq!(processed[0].path, "a.rs");
    }
}
