// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Root path prefixing for multi-root packs.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Whether output paths get a root prefix.
///
/// An explicit setting wins; otherwise prefixes are added only when more
/// than one root is packed.
pub fn should_prefix(show_root_path: Option<bool>, root_count: usize) -> bool {
    show_root_path.unwrap_or(root_count > 1)
}

/// Which root each collected file came from, in collection order.
#[derive(Debug, Clone, Default)]
pub struct RootIndex {
    assignments: Vec<usize>,
    first_by_path: HashMap<String, usize>,
}

impl RootIndex {
    pub fn record(&mut self, path: &str, root: usize) {
        self.assignments.push(root);
        self.first_by_path.entry(path.to_string()).or_insert(root);
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Split assignments into (kept, excluded) following a screening mask.
    pub fn split(&self, mask: &[bool]) -> (Vec<usize>, Vec<usize>) {
        if mask.len() != self.assignments.len() {
            tracing::debug!(
                "Root index has {} entries but mask has {}; falling back to path lookup",
                self.assignments.len(),
                mask.len()
            );
            return (Vec::new(), Vec::new());
        }
        let mut kept = Vec::new();
        let mut excluded = Vec::new();
        for (&root, &safe) in self.assignments.iter().zip(mask) {
            if safe {
                kept.push(root);
            } else {
                excluded.push(root);
            }
        }
        (kept, excluded)
    }

    /// First root a path was seen in; 0 when unknown.
    pub fn lookup(&self, path: &str) -> usize {
        self.first_by_path.get(path).copied().unwrap_or(0)
    }
}

/// Rewrites root-relative paths into cwd-relative ones.
#[derive(Debug, Clone)]
pub struct PathPrefixer {
    prefixes: Vec<String>,
}

impl PathPrefixer {
    pub fn new(cwd: &Path, roots: &[PathBuf]) -> Self {
        let prefixes = roots.iter().map(|root| relative_to(root, cwd)).collect();
        Self { prefixes }
    }

    pub fn prefix(&self, root: usize) -> &str {
        self.prefixes.get(root).map_or("", String::as_str)
    }

    pub fn apply(&self, root: usize, path: &str) -> String {
        match self.prefix(root) {
            "" => path.to_string(),
            prefix => format!("{prefix}/{path}"),
        }
    }
}

/// `path` expressed relative to `base`, `/`-separated. Empty when they are
/// the same directory; uses `..` when `path` is outside `base`.
pub fn relative_to(path: &Path, base: &Path) -> String {
    let path: Vec<Component<'_>> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat_n("..".to_string(), base.len() - common);
    let downs = path[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("/")
}
