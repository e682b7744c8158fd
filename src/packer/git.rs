// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Read-only git queries.
//!
//! Every helper here is fail-open: a missing git binary, a directory outside a
//! work tree, or a failing command yields an empty value and a trace log line,
//! never an error.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::GitDiffResult;
use super::deps::GitDiffSource;
use crate::utils::error::PackError;

/// Executes git commands. `dir` becomes `git -C <dir>`.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run git and return its stdout. A non-zero exit status is an error.
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, PackError>;
}

/// [`GitRunner`] backed by the `git` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

#[async_trait]
impl GitRunner for GitCli {
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, PackError> {
        let mut cmd = Command::new("git");
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PackError::GitCommand(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Whether a usable git binary is available.
pub async fn is_git_installed(runner: &dyn GitRunner) -> bool {
    match runner.run(None, &["--version"]).await {
        Ok(version) => version.contains("git version") && !version.contains("error"),
        Err(e) => {
            tracing::trace!("Git is not installed: {e}");
            false
        }
    }
}

/// Whether `dir` is inside a git work tree.
pub async fn is_git_repository(runner: &dyn GitRunner, dir: &Path) -> bool {
    match runner
        .run(Some(dir), &["rev-parse", "--is-inside-work-tree"])
        .await
    {
        Ok(stdout) => stdout.trim() == "true",
        Err(e) => {
            tracing::trace!("Not a git repository ({}): {e}", dir.display());
            false
        }
    }
}

/// Diff limited to `dir` itself, so roots sharing a repository each get
/// only their own hunks.
async fn exec_diff(runner: &dyn GitRunner, dir: &Path, staged: bool) -> String {
    let mut args = vec!["diff", "--no-color"];
    if staged {
        args.push("--cached");
    }
    args.extend(["--", "."]);
    match runner.run(Some(dir), &args).await {
        Ok(diff) => diff,
        Err(e) => {
            tracing::trace!("Failed to get git diff: {e}");
            String::new()
        }
    }
}

/// Unstaged changes in the work tree of `dir`; empty when unavailable.
pub async fn get_work_tree_diff(runner: &dyn GitRunner, dir: &Path) -> String {
    if !is_git_repository(runner, dir).await {
        return String::new();
    }
    exec_diff(runner, dir, false).await
}

/// Changes staged in the index of `dir`; empty when unavailable.
pub async fn get_staged_diff(runner: &dyn GitRunner, dir: &Path) -> String {
    if !is_git_repository(runner, dir).await {
        return String::new();
    }
    exec_diff(runner, dir, true).await
}

/// How many of the last `max_commits` commits touched each path.
pub async fn get_file_change_count(
    runner: &dyn GitRunner,
    dir: &Path,
    max_commits: usize,
) -> HashMap<String, usize> {
    let depth = max_commits.to_string();
    let log = runner
        .run(
            Some(dir),
            &["log", "--name-only", "--pretty=format:", "-n", &depth],
        )
        .await;

    match log {
        Ok(stdout) => count_paths(stdout.lines()),
        Err(e) => {
            tracing::trace!("Failed to get file change counts: {e}");
            HashMap::new()
        }
    }
}

fn count_paths<'a>(paths: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for path in paths.map(str::trim).filter(|p| !p.is_empty()) {
        *counts.entry(path.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Default [`GitDiffSource`]: work-tree and staged diffs via a [`GitRunner`].
#[derive(Clone)]
pub struct GitDiffProvider {
    runner: Arc<dyn GitRunner>,
}

impl GitDiffProvider {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }
}

impl std::fmt::Debug for GitDiffProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitDiffProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl GitDiffSource for GitDiffProvider {
    async fn diff(&self, root: &Path) -> Option<GitDiffResult> {
        let runner = self.runner.as_ref();
        if !is_git_repository(runner, root).await {
            tracing::trace!("Skipping git diffs for {}", root.display());
            return None;
        }
        let (work_tree_diff, staged_diff) =
            tokio::join!(exec_diff(runner, root, false), exec_diff(runner, root, true));
        Some(GitDiffResult {
            work_tree_diff,
            staged_diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Responder = dyn Fn(&[&str]) -> Result<String, PackError> + Send + Sync;

    /// Answers git invocations from a closure and records them.
    struct StubGit {
        respond: Box<Responder>,
        calls: Mutex<Vec<String>>,
    }

    impl StubGit {
        fn new(respond: impl Fn(&[&str]) -> Result<String, PackError> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GitRunner for StubGit {
        async fn run(&self, _dir: Option<&Path>, args: &[&str]) -> Result<String, PackError> {
            self.calls.lock().unwrap().push(args.join(" "));
            (self.respond)(args)
        }
    }

    fn failure(msg: &str) -> PackError {
        PackError::GitCommand(msg.to_string())
    }

    fn repo_with_diff(diff: &'static str) -> StubGit {
        StubGit::new(move |args| match args[0] {
            "rev-parse" => Ok("true\n".to_string()),
            "diff" => Ok(diff.to_string()),
            _ => Err(failure("unexpected")),
        })
    }

    #[tokio::test]
    async fn test_file_change_count() {
        let git = StubGit::new(|_| Ok("a.ts\nb.ts\n\na.ts\nc.ts\n\nb.ts\n".to_string()));
        let counts = get_file_change_count(&git, Path::new("/test/dir"), 5).await;

        let expected = HashMap::from([
            ("a.ts".to_string(), 2),
            ("b.ts".to_string(), 2),
            ("c.ts".to_string(), 1),
        ]);
        assert_eq!(counts, expected);
        assert_eq!(git.calls(), vec!["log --name-only --pretty=format: -n 5"]);
    }

    #[tokio::test]
    async fn test_file_change_count_empty_on_failure() {
        let git = StubGit::new(|_| Err(failure("git command failed")));
        assert!(get_file_change_count(&git, Path::new("/x"), 5).await.is_empty());

        let git = StubGit::new(|_| Ok(String::new()));
        assert!(get_file_change_count(&git, Path::new("/x"), 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_work_tree_diff() {
        let git = repo_with_diff("diff --git a/file.txt b/file.txt\n+new line");
        let diff = get_work_tree_diff(&git, Path::new("/test/dir")).await;
        assert_eq!(diff, "diff --git a/file.txt b/file.txt\n+new line");
        assert_eq!(
            git.calls(),
            vec!["rev-parse --is-inside-work-tree", "diff --no-color -- ."]
        );
    }

    #[tokio::test]
    async fn test_staged_diff_uses_cached() {
        let git = repo_with_diff("diff --git a/staged.txt b/staged.txt\n+staged content");
        let diff = get_staged_diff(&git, Path::new("/test/dir")).await;
        assert!(diff.contains("staged content"));
        assert_eq!(git.calls()[1], "diff --no-color --cached -- .");
    }

    #[tokio::test]
    async fn test_diff_skipped_outside_repository() {
        let git = StubGit::new(|args| match args[0] {
            "rev-parse" => Err(failure("not a git repository")),
            _ => Ok("should not be called".to_string()),
        });
        assert_eq!(get_work_tree_diff(&git, Path::new("/x")).await, "");
        assert_eq!(get_staged_diff(&git, Path::new("/x")).await, "");
        assert!(git.calls().iter().all(|c| c.starts_with("rev-parse")));
    }

    #[tokio::test]
    async fn test_diff_empty_when_command_fails() {
        let git = StubGit::new(|args| match args[0] {
            "rev-parse" => Ok("true".to_string()),
            _ => Err(failure("Failed to get diff")),
        });
        assert_eq!(get_work_tree_diff(&git, Path::new("/x")).await, "");
    }

    #[tokio::test]
    async fn test_is_git_repository() {
        let git = StubGit::new(|_| Ok("true\n".to_string()));
        assert!(is_git_repository(&git, Path::new("/x")).await);

        let git = StubGit::new(|_| Ok("false\n".to_string()));
        assert!(!is_git_repository(&git, Path::new("/x")).await);

        let git = StubGit::new(|_| Err(failure("Not a git repository")));
        assert!(!is_git_repository(&git, Path::new("/x")).await);
    }

    #[tokio::test]
    async fn test_is_git_installed() {
        let git = StubGit::new(|_| Ok("git version 2.34.1".to_string()));
        assert!(is_git_installed(&git).await);

        let git = StubGit::new(|_| Err(failure("Command not found: git")));
        assert!(!is_git_installed(&git).await);

        let git = StubGit::new(|_| Ok("error: git not found".to_string()));
        assert!(!is_git_installed(&git).await);
    }

    #[tokio::test]
    async fn test_provider_returns_none_outside_repository() {
        let provider = GitDiffProvider::new(Arc::new(StubGit::new(|_| Err(failure("nope")))));
        assert!(provider.diff(Path::new("/x")).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_collects_both_diffs() {
        let provider = GitDiffProvider::new(Arc::new(StubGit::new(|args| match args {
            ["rev-parse", ..] => Ok("true".to_string()),
            ["diff", "--no-color", "--cached", "--", "."] => Ok("staged".to_string()),
            ["diff", "--no-color", "--", "."] => Ok("work".to_string()),
            _ => Err(failure("unexpected")),
        })));
        let diff = provider.diff(Path::new("/x")).await.expect("diff");
        assert_eq!(diff.work_tree_diff, "work");
        assert_eq!(diff.staged_diff, "staged");
    }
}
