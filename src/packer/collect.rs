// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::RawFile;
use super::deps::FileCollector;
use crate::MergedConfig;
use crate::utils::error::PackError;
use crate::utils::progress::ProgressCallback;

/// Files larger than this are skipped.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const DEFAULT_CONCURRENCY: usize = 32;
const PROGRESS_INTERVAL: usize = 50;
const UTF8_BOM: char = '\u{feff}';

/// Default [`FileCollector`]: reads files concurrently, keeping input order.
#[derive(Debug, Clone, Copy)]
pub struct DiskCollector {
    pub max_file_size: u64,
    pub concurrency: usize,
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Why a file was left out of the collection.
#[derive(Debug, PartialEq, Eq)]
enum Skip {
    TooLarge(u64),
    Binary,
    NotUtf8,
}

fn decode(bytes: Vec<u8>) -> Result<String, Skip> {
    if bytes.contains(&0) {
        return Err(Skip::Binary);
    }
    let text = String::from_utf8(bytes).map_err(|_| Skip::NotUtf8)?;
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

impl DiskCollector {
    async fn read_one(&self, full_path: PathBuf, path: String) -> Option<RawFile> {
        let result = async {
            let metadata = tokio::fs::metadata(&full_path).await?;
            if metadata.len() > self.max_file_size {
                return Ok(Err(Skip::TooLarge(metadata.len())));
            }
            let bytes = tokio::fs::read(&full_path).await?;
            Ok::<_, std::io::Error>(decode(bytes))
        }
        .await;

        match result {
            Ok(Ok(content)) => Some(RawFile { path, content }),
            Ok(Err(skip)) => {
                tracing::debug!("Skipping {path}: {skip:?}");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", full_path.display());
                None
            }
        }
    }
}

#[async_trait]
impl FileCollector for DiskCollector {
    async fn collect(
        &self,
        paths: &[String],
        root: &Path,
        _config: &MergedConfig,
        progress: &ProgressCallback,
    ) -> Result<Vec<RawFile>, PackError> {
        let total = paths.len();
        let files: Vec<RawFile> = stream::iter(paths.iter().cloned())
            .map(|path| self.read_one(root.join(&path), path))
            .buffered(self.concurrency.max(1))
            .enumerate()
            .filter_map(|(i, file)| {
                if (i + 1) % PROGRESS_INTERVAL == 0 {
                    progress(&format!("Collecting files... ({}/{total})", i + 1));
                }
                futures::future::ready(file)
            })
            .collect()
            .await;

        tracing::debug!(
            "Collected {} of {total} files from {}",
            files.len(),
            root.display()
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn noop(_: &str) {}

    #[test]
    fn test_decode() {
        assert_eq!(decode(b"hello".to_vec()), Ok("hello".to_string()));
        assert_eq!(decode(b"\xef\xbb\xbfhi".to_vec()), Ok("hi".to_string()));
        assert_eq!(decode(b"a\0b".to_vec()), Err(Skip::Binary));
        assert_eq!(decode(vec![0xff, 0xfe, 0x41]), Err(Skip::NotUtf8));
    }

    #[tokio::test]
    async fn test_collect_preserves_order_and_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "bee").unwrap();
        fs::write(dir.path().join("a.txt"), "ay").unwrap();
        fs::write(dir.path().join("bin.dat"), [0u8, 1, 2]).unwrap();

        let paths: Vec<String> = ["b.txt", "missing.txt", "bin.dat", "a.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let files = DiskCollector::default()
            .collect(&paths, dir.path(), &MergedConfig::default(), &noop)
            .await
            .unwrap();

        assert_eq!(
            files,
            vec![RawFile::new("b.txt", "bee"), RawFile::new("a.txt", "ay")]
        );
    }

    #[tokio::test]
    async fn test_collect_skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "0123456789").unwrap();
        fs::write(dir.path().join("small.txt"), "01").unwrap();

        let collector = DiskCollector {
            max_file_size: 5,
            concurrency: 2,
        };
        let paths = vec!["big.txt".to_string(), "small.txt".to_string()];
        let files = collector
            .collect(&paths, dir.path(), &MergedConfig::default(), &noop)
            .await
            .unwrap();
        assert_eq!(files, vec![RawFile::new("small.txt", "01")]);
    }
}
