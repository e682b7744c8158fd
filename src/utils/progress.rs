// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

/// Receives a short status line at each pipeline stage boundary.
///
/// Calls are fire-and-forget; a no-op closure is a valid callback.
pub type ProgressCallback = dyn Fn(&str) + Send + Sync;

/// Terminal spinner fed by the pipeline's progress messages.
///
/// When stdout is not a TTY (piped output, CI) or output is suppressed, the
/// spinner is hidden and produces no output.
#[derive(Clone)]
pub struct PackProgress {
    spinner: ProgressBar,
}

impl PackProgress {
    #[must_use]
    pub fn new(suppressed: bool) -> Self {
        let spinner = if suppressed || !Term::stdout().is_term() {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        };
        spinner.set_style(Self::style());
        Self { spinner }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to parse progress spinner template: {e}");
                ProgressStyle::default_spinner()
            })
    }

    pub fn set_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    /// Clear the spinner from the terminal.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.spinner.is_hidden()
    }
}

impl std::fmt::Debug for PackProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackProgress")
            .field("hidden", &self.spinner.is_hidden())
            .finish()
    }
}
