// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Artifact delivery: the output file and the system clipboard.

use std::path::Path;

use async_trait::async_trait;

use crate::MergedConfig;
use crate::packer::deps::{ClipboardCopier, OutputWriter};
use crate::utils::error::PackError;
use crate::utils::progress::ProgressCallback;

/// Write `content` to `path`, creating parent directories as needed.
pub async fn write_output(path: &Path, content: &str) -> Result<(), PackError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            PackError::FileSystem(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", parent.display(), e),
            ))
        })?;
    }

    tokio::fs::write(path, content).await.map_err(|e| {
        PackError::FileSystem(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", path.display(), e),
        ))
    })?;

    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Default [`OutputWriter`]: writes to `config.output_path()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskWriter;

#[async_trait]
impl OutputWriter for DiskWriter {
    async fn write(&self, output: &str, config: &MergedConfig) -> Result<(), PackError> {
        write_output(&config.output_path(), output).await
    }
}

/// Default [`ClipboardCopier`] using the OS clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardCopier for SystemClipboard {
    async fn copy(&self, output: &str, _progress: &ProgressCallback) -> Result<(), PackError> {
        let text = output.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), arboard::Error> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)
        })
        .await
        .map_err(|e| PackError::OutputFormat(format!("Clipboard task failed: {e}")))?
        .map_err(|e| PackError::OutputFormat(format!("Failed to copy to clipboard: {e}")))?;

        tracing::debug!("Copied {} bytes to the clipboard", output.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_output_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/out.xml");

        write_output(&path, "<files/>").await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<files/>");
    }

    #[tokio::test]
    async fn test_disk_writer_uses_config_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = MergedConfig::new(temp_dir.path());
        config.output.file_path = "out/pack.md".into();

        DiskWriter.write("# packed", &config).await.unwrap();
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("out/pack.md")).unwrap(),
            "# packed"
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_output(&blocker.join("child.txt"), "y").await.unwrap_err();
        assert!(matches!(err, PackError::FileSystem(_)));
    }
}
