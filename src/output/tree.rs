// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::packer::sort::normalize_separators;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    is_file: bool,
}

impl Node {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
        node.is_file = true;
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let dirs = self.children.iter().filter(|(_, n)| !n.children.is_empty());
        for (name, child) in dirs {
            out.push_str(&format!("{indent}{name}/\n"));
            child.render(depth + 1, out);
        }
        let files = self.children.iter().filter(|(_, n)| n.is_file);
        for (name, _) in files {
            out.push_str(&format!("{indent}{name}\n"));
        }
    }
}

/// Render paths as an indented tree: two spaces per level, directories
/// first with a trailing `/`, names compared byte-wise.
pub fn render_tree(paths: &[String]) -> String {
    let mut root = Node::default();
    for path in paths {
        root.insert(&normalize_separators(path));
    }
    let mut out = String::new();
    root.render(0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_render_tree() {
        let tree = render_tree(&strings(&[
            "README.md",
            "src/main.rs",
            "src/utils/mod.rs",
            "Cargo.toml",
        ]));
        assert_eq!(
            tree,
            "src/\n  utils/\n    mod.rs\n  main.rs\nCargo.toml\nREADME.md"
        );
    }

    #[test]
    fn test_render_tree_is_order_independent() {
        let a = render_tree(&strings(&["b/x", "a/y", "c"]));
        let b = render_tree(&strings(&["c", "a/y", "b/x"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_tree_empty() {
        assert_eq!(render_tree(&[]), "");
    }
}
