// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use thiserror::Error;

/// Pipeline stages whose failure aborts a pack run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Search,
    Collect,
    Process,
    Generate,
    Write,
    Metrics,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Search => "file search",
            Self::Collect => "file collection",
            Self::Process => "file processing",
            Self::Generate => "output generation",
            Self::Write => "output write",
            Self::Metrics => "metrics calculation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(#[from] git2::Error),

    #[error("Git command error: {0}")]
    GitCommand(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Output format error: {0}")]
    OutputFormat(String),

    #[error("Remote repository error: {message}")]
    Remote {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}\nSuggestion: {suggestion}")]
    ValidationError { message: String, suggestion: String },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<PackError>,
    },
}

impl PackError {
    /// Attach the failing pipeline stage to an error.
    ///
    /// Errors that already carry a stage are returned unchanged so the
    /// innermost stage wins.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage this error originated from, if it was raised by the pipeline.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn invalid_style(style: &str) -> Self {
        PackError::ValidationError {
            message: format!("Invalid output style: '{}'", style),
            suggestion: "Valid styles are: plain, xml, markdown".to_string(),
        }
    }

    pub fn invalid_encoding(encoding: &str) -> Self {
        PackError::ValidationError {
            message: format!("Unknown token count encoding: '{}'", encoding),
            suggestion:
                "Supported encodings are: o200k_base, cl100k_base, p50k_base, p50k_edit, r50k_base"
                    .to_string(),
        }
    }

    pub fn remote(message: impl Into<String>, source: git2::Error) -> Self {
        PackError::Remote {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<toml::ser::Error> for PackError {
    fn from(err: toml::ser::Error) -> Self {
        PackError::Config(format!("Failed to serialize TOML configuration: {err}"))
    }
}

/// Format an error for terminal display, walking its source chain.
pub fn format_error(error: &PackError, verbose: bool) -> String {
    let mut out = format!("\n\u{26a0} Error: {error}");

    if verbose {
        let mut source = std::error::Error::source(error);
        let mut causes = Vec::new();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        if !causes.is_empty() {
            out.push_str("\n\nCaused by:");
            for (i, cause) in causes.iter().enumerate() {
                let prefix = if i == causes.len() - 1 {
                    "\u{2514}\u{2500}"
                } else {
                    "\u{251c}\u{2500}"
                };
                out.push_str(&format!("\n{prefix} {cause}"));
            }
        }
    }

    out
}
