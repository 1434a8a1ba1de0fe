// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-disk storage layout.

use std::path::{Path, PathBuf};

use super::FileName;

/// Default base directory for all persistent state.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the file exchange data root.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
    key_file: Option<PathBuf>,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            key_file: None,
        }
    }

    /// Keep the key file somewhere other than the data root.
    pub fn with_key_file(mut self, path: impl AsRef<Path>) -> Self {
        self.key_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Root directory for all persistent state.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Key Paths ==========

    /// Path to the raw symmetric key.
    pub fn key_file(&self) -> PathBuf {
        self.key_file
            .clone()
            .unwrap_or_else(|| self.root.join("key.key"))
    }

    // ========== Stored File Paths ==========

    /// Directory containing ciphertext blobs.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join("server_files")
    }

    /// Path to the ciphertext blob for a stored name.
    pub fn stored_file(&self, name: &FileName) -> PathBuf {
        self.files_dir().join(name.as_str())
    }

    /// Staging directory for writes that are renamed into place.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("incoming")
    }

    // ========== Transient Plaintext Paths ==========

    /// Directory holding decrypted copies while a download is in flight.
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("temp")
    }

    // ========== Access Log Paths ==========

    /// Path to the download log (JSON Lines).
    pub fn access_log_file(&self) -> PathBuf {
        self.root.join("download_log.txt")
    }
}
