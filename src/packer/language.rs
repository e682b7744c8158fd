// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

/// Languages whose comment syntax the processor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Shell,
    Css,
    Sql,
    Html,
    Xml,
    Yaml,
    Toml,
}

/// How comments and string literals are written in a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: &'static [&'static str],
    pub block: Option<(&'static str, &'static str)>,
    /// Characters that open (and close) a string literal
    pub quotes: &'static [char],
    /// `'x'` is a character literal but a lone `'` is not a quote (Rust lifetimes)
    pub char_literals: bool,
}

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));

impl Language {
    pub fn comment_syntax(self) -> CommentSyntax {
        match self {
            Self::TypeScript | Self::JavaScript => CommentSyntax {
                line: &["//"],
                block: C_BLOCK,
                quotes: &['"', '\'', '`'],
                char_literals: false,
            },
            Self::Go => CommentSyntax {
                line: &["//"],
                block: C_BLOCK,
                quotes: &['"', '\'', '`'],
                char_literals: false,
            },
            // `'` also starts lifetimes, so it is not treated as a quote.
            Self::Rust => CommentSyntax {
                line: &["//"],
                block: C_BLOCK,
                quotes: &['"'],
                char_literals: true,
            },
            Self::Java | Self::C | Self::Cpp | Self::CSharp => CommentSyntax {
                line: &["//"],
                block: C_BLOCK,
                quotes: &['"', '\''],
                char_literals: false,
            },
            Self::Php => CommentSyntax {
                line: &["//", "#"],
                block: C_BLOCK,
                quotes: &['"', '\''],
                char_literals: false,
            },
            Self::Python | Self::Ruby | Self::Shell | Self::Yaml | Self::Toml => CommentSyntax {
                line: &["#"],
                block: None,
                quotes: &['"', '\''],
                char_literals: false,
            },
            Self::Css => CommentSyntax {
                line: &[],
                block: C_BLOCK,
                quotes: &['"', '\''],
                char_literals: false,
            },
            Self::Sql => CommentSyntax {
                line: &["--"],
                block: C_BLOCK,
                quotes: &['\''],
                char_literals: false,
            },
            Self::Html | Self::Xml => CommentSyntax {
                line: &[],
                block: Some(("<!--", "-->")),
                quotes: &[],
                char_literals: false,
            },
        }
    }
}

/// Detect programming language from file extension.
pub fn detect_language(path: &Path) -> Option<Language> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext_str| match ext_str.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            "go" => Some(Language::Go),
            "java" | "kt" | "scala" | "swift" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            "cpp" | "hpp" | "cc" | "cxx" | "hh" => Some(Language::Cpp),
            "cs" => Some(Language::CSharp),
            "rb" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "sh" | "bash" | "zsh" => Some(Language::Shell),
            "css" | "scss" | "less" => Some(Language::Css),
            "sql" => Some(Language::Sql),
            "html" | "htm" | "vue" | "svelte" => Some(Language::Html),
            "xml" | "svg" => Some(Language::Xml),
            "yml" | "yaml" => Some(Language::Yaml),
            "toml" => Some(Language::Toml),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("src/main.rs")), Some(Language::Rust));
        assert_eq!(detect_language(Path::new("app/index.TSX")), Some(Language::TypeScript));
        assert_eq!(detect_language(Path::new("setup.py")), Some(Language::Python));
        assert_eq!(detect_language(Path::new("README")), None);
        assert_eq!(detect_language(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_rust_does_not_quote_single_tick() {
        let syntax = Language::Rust.comment_syntax();
        assert!(!syntax.quotes.contains(&'\''));
        assert!(syntax.char_literals);
        assert_eq!(syntax.line, &["//"]);
        assert!(!Language::C.comment_syntax().char_literals);
    }
}
