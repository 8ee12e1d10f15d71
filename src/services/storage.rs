// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plain-directory store for uploaded audio bytes.
//!
//! Files are written with an exclusive create, so two uploads racing for the
//! same name cannot overwrite each other: the second one sees `Conflict`.

use crate::error::AppError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const MAX_FILENAME_LEN: usize = 255;

/// Directory-backed audio store.
#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

impl AudioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create audio directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Path a validated filename is stored under.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write `bytes` to a new file; fails with `Conflict` if the name is taken.
    pub async fn write_new(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        validate_filename(filename)?;
        let path = self.path_for(filename);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    AppError::Conflict(format!("File '{}' already exists", filename))
                }
                _ => AppError::Internal(anyhow::anyhow!(
                    "Failed to create {}: {}",
                    path.display(),
                    e
                )),
            })?;

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Don't leave a truncated file holding the name.
            self.remove(&path).await;
            return Err(AppError::Internal(anyhow::anyhow!(
                "Failed to write {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored audio file");
        Ok(path)
    }

    /// Remove a stored file; failures are logged, not returned.
    pub async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed audio file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove audio file"),
        }
    }
}

/// Reject names that are not a single plain path component.
pub fn validate_filename(filename: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::BadRequest(format!("Invalid filename: {}", reason));

    if filename.trim().is_empty() {
        return Err(invalid("empty"));
    }
    if filename.len() > MAX_FILENAME_LEN {
        return Err(invalid("too long"));
    }
    if filename == "." || filename == ".." {
        return Err(invalid("reserved name"));
    }
    if filename.contains(['/', '\\', '\0']) {
        return Err(invalid("must not contain path separators"));
    }
    Ok(())
}
