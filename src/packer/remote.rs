// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Cloning remote repositories for packing.

use std::path::{Path, PathBuf};

use git2::Repository;
use git2::build::CheckoutBuilder;
use tempfile::TempDir;

use crate::MergedConfig;
use crate::utils::error::PackError;

fn is_shorthand_part(part: &str) -> bool {
    !part.is_empty()
        && !part.starts_with('.')
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Expand `owner/repo` to a GitHub clone URL; anything else is returned as is.
pub fn normalize_remote_url(spec: &str) -> String {
    let spec = spec.trim();
    match spec.split_once('/') {
        Some((owner, repo)) if is_shorthand_part(owner) && is_shorthand_part(repo) => {
            format!("https://github.com/{owner}/{repo}.git")
        }
        _ => spec.to_string(),
    }
}

/// Directory name for a clone of `url`: its last path segment without
/// `.git`, or `repository` when the URL has none.
pub fn repo_name(url: &str) -> String {
    let name = url
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or_default();
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() || name == "." || name == ".." {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

/// A cloned repository. The clone lives at `root`, a directory named after
/// the repository inside a temporary directory that is removed on drop.
#[derive(Debug)]
pub struct RemoteCheckout {
    dir: TempDir,
    root: PathBuf,
}

impl RemoteCheckout {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `config` rebased onto the checkout, so a shown root path reads as the
    /// repository name. The output file stays where `config` puts it.
    pub fn pack_config(&self, config: &MergedConfig) -> MergedConfig {
        let mut config = config.clone();
        config.output.file_path = config.output_path();
        config.cwd = self.dir.path().to_path_buf();
        config
    }
}

/// Clone `url` into a fresh temporary directory, optionally checking out
/// `branch` (a branch, tag or commit).
pub async fn clone_remote(url: &str, branch: Option<&str>) -> Result<RemoteCheckout, PackError> {
    let dir = tempfile::Builder::new().prefix("repopack-").tempdir()?;
    let root = dir.path().join(repo_name(url));
    let dest = root.clone();
    let url = url.to_string();
    let branch = branch.map(str::to_string);

    tokio::task::spawn_blocking(move || clone_into(&url, &dest, branch.as_deref()))
        .await
        .map_err(|e| PackError::Remote {
            message: "Clone task failed".to_string(),
            source: Some(Box::new(e)),
        })??;

    Ok(RemoteCheckout { dir, root })
}

fn clone_into(url: &str, dest: &Path, branch: Option<&str>) -> Result<(), PackError> {
    tracing::debug!("Cloning {url} into {}", dest.display());
    let repo = Repository::clone(url, dest)
        .map_err(|e| PackError::remote(format!("Failed to clone {url}"), e))?;

    if let Some(branch) = branch {
        checkout_ref(&repo, branch)?;
    }
    Ok(())
}

fn checkout_ref(repo: &Repository, reference: &str) -> Result<(), PackError> {
    let object = repo
        .revparse_single(&format!("origin/{reference}"))
        .or_else(|_| repo.revparse_single(reference))
        .map_err(|e| PackError::remote(format!("Unknown branch or commit '{reference}'"), e))?;

    repo.checkout_tree(&object, Some(CheckoutBuilder::new().force()))?;
    let commit = object.peel_to_commit()?;
    repo.set_head_detached(commit.id())?;
    tracing::debug!("Checked out {reference} at {}", commit.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::prefix::PathPrefixer;
    use git2::Signature;
    use std::fs;

    #[test]
    fn test_normalize_shorthand() {
        assert_eq!(
            normalize_remote_url("rust-lang/rust"),
            "https://github.com/rust-lang/rust.git"
        );
        assert_eq!(
            normalize_remote_url("https://gitlab.com/a/b.git"),
            "https://gitlab.com/a/b.git"
        );
        assert_eq!(
            normalize_remote_url("git@github.com:a/b.git"),
            "git@github.com:a/b.git"
        );
        assert_eq!(normalize_remote_url("./local/repo"), "./local/repo");
        assert_eq!(normalize_remote_url("a/b/c"), "a/b/c");
    }

    #[test]
    fn test_repo_name() {
        assert_eq!(repo_name("https://github.com/rust-lang/rust.git"), "rust");
        assert_eq!(repo_name("git@github.com:a/b.git"), "b");
        assert_eq!(repo_name("git@host:proj.git"), "proj");
        assert_eq!(repo_name("/srv/git/tool/"), "tool");
        assert_eq!(repo_name("https://host/"), "host");
        assert_eq!(repo_name(".."), "repository");
        assert_eq!(repo_name(""), "repository");
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        let parents: Vec<git2::Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[tokio::test]
    async fn test_clone_local_repository_at_commit() {
        let source = TempDir::new().unwrap();
        let repo = Repository::init(source.path()).unwrap();
        let first = commit_file(&repo, "a.txt", "one", "first");
        commit_file(&repo, "a.txt", "two", "second");

        let url = source.path().to_string_lossy().into_owned();
        let latest = clone_remote(&url, None).await.unwrap();
        assert_eq!(fs::read_to_string(latest.root().join("a.txt")).unwrap(), "two");

        let pinned = clone_remote(&url, Some(&first.to_string())).await.unwrap();
        assert_eq!(fs::read_to_string(pinned.root().join("a.txt")).unwrap(), "one");
    }

    #[tokio::test]
    async fn test_unknown_reference_is_remote_error() {
        let source = TempDir::new().unwrap();
        let repo = Repository::init(source.path()).unwrap();
        commit_file(&repo, "a.txt", "one", "first");

        let url = source.path().to_string_lossy().into_owned();
        let err = clone_remote(&url, Some("no-such-branch")).await.unwrap_err();
        assert!(matches!(err, PackError::Remote { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_checkout_root_path_is_repository_name() {
        let source = TempDir::new().unwrap();
        let repo = Repository::init(source.path().join("widgets")).unwrap();
        commit_file(&repo, "a.txt", "one", "first");

        let url = source.path().join("widgets").to_string_lossy().into_owned();
        let checkout = clone_remote(&url, None).await.unwrap();
        assert!(checkout.root().ends_with("widgets"));

        let mut config = MergedConfig::new("/work/project");
        config.output.show_root_path = Some(true);
        let config = checkout.pack_config(&config);
        assert_eq!(
            config.output_path(),
            Path::new("/work/project").join("repopack-output.xml")
        );

        let prefixer = PathPrefixer::new(&config.cwd, &[checkout.root().to_path_buf()]);
        assert_eq!(prefixer.apply(0, "a.txt"), "widgets/a.txt");
    }
}
