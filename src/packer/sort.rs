// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic path ordering.
//!
//! Paths are compared component by component. Within a shared parent a
//! directory sorts before a file, otherwise components compare byte-wise.
//! Backslashes are treated as separators so Windows and Unix inputs order
//! identically.

use std::cmp::Ordering;
use std::collections::HashSet;

/// Normalize path to a forward-slash separated string.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Each component tagged with whether it is the final (file) component.
/// `false < true`, so directories sort ahead of files at every level.
fn component_key(path: &str) -> Vec<(bool, &str)> {
    let parts: Vec<&str> = path.split('/').collect();
    let last = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| (i == last, part))
        .collect()
}

/// Compare two paths under the pack ordering.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let norm_a = normalize_separators(a);
    let norm_b = normalize_separators(b);
    component_key(&norm_a)
        .cmp(&component_key(&norm_b))
        // Equal after normalization (e.g. `a\b` vs `a/b`): fall back to the raw text.
        .then_with(|| a.cmp(b))
}

/// Sort a set of paths into the pack order. Duplicates are removed.
pub fn sort_paths(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(paths.len());
    let mut unique: Vec<String> = paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect();
    unique.sort_by(|a, b| compare_paths(a, b));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let expected = strings(&["a/x.txt", "a/y.txt", "b/z.txt"]);
        let permutations = [
            ["b/z.txt", "a/y.txt", "a/x.txt"],
            ["a/x.txt", "b/z.txt", "a/y.txt"],
            ["a/y.txt", "a/x.txt", "b/z.txt"],
            ["b/z.txt", "a/x.txt", "a/y.txt"],
            ["a/x.txt", "a/y.txt", "b/z.txt"],
            ["a/y.txt", "b/z.txt", "a/x.txt"],
        ];
        for input in permutations {
            assert_eq!(sort_paths(strings(&input)), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_directories_before_files() {
        let sorted = sort_paths(strings(&["README.md", "src/main.rs", "Cargo.toml", "src/a/b.rs"]));
        assert_eq!(
            sorted,
            strings(&["src/a/b.rs", "src/main.rs", "Cargo.toml", "README.md"])
        );
    }

    #[test]
    fn test_separators_are_normalized() {
        let sorted = sort_paths(strings(&["b\\z.txt", "a/x.txt"]));
        assert_eq!(sorted, strings(&["a/x.txt", "b\\z.txt"]));
        assert_eq!(compare_paths("a\\b.txt", "a/c.txt"), Ordering::Less);
    }

    #[test]
    fn test_byte_wise_comparison_without_locale() {
        // Uppercase sorts before lowercase byte-wise.
        let sorted = sort_paths(strings(&["b.txt", "B.txt", "a.txt"]));
        assert_eq!(sorted, strings(&["B.txt", "a.txt", "b.txt"]));
    }

    #[test]
    fn test_duplicates_removed() {
        let sorted = sort_paths(strings(&["a.txt", "a.txt", "b.txt"]));
        assert_eq!(sorted, strings(&["a.txt", "b.txt"]));
    }

    #[test]
    fn test_strict_order_for_distinct_paths() {
        assert_ne!(compare_paths("a/b", "a\\b"), Ordering::Equal);
        assert_eq!(compare_paths("x", "x"), Ordering::Equal);
    }

    #[test]
    fn test_file_and_directory_with_same_name_order_consistently() {
        // Possible when several roots are unioned.
        let sorted = sort_paths(strings(&["b/c", "a", "a/b"]));
        assert_eq!(sorted, strings(&["a/b", "b/c", "a"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_paths(Vec::new()).is_empty());
    }
}
