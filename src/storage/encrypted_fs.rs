// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted file store.
//!
//! Blobs are sealed with the [`CipherCodec`] before they are written and
//! opened again on read. The durable copy is always ciphertext; plaintext
//! only reaches the disk through a [`TransientPlaintext`] for the lifetime
//! of a single download.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use utoipa::ToSchema;

use super::{
    transient, CipherCodec, FileName, StorageError, StoragePaths, StorageResult,
    TransientPlaintext,
};

/// Listing entry for a stored file.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct StoredFileInfo {
    /// Stored file name (the upload's original filename).
    pub name: String,
    /// Size on disk in bytes. This is the ciphertext length, not the
    /// original plaintext length.
    pub size: u64,
}

/// Encrypted blob storage keyed by file name.
#[derive(Debug)]
pub struct FileStore {
    paths: StoragePaths,
    codec: CipherCodec,
}

impl FileStore {
    /// Create a new FileStore.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths, codec: CipherCodec) -> Self {
        Self { paths, codec }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the store directories and clear out stale plaintext.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn initialize(&self) -> StorageResult<()> {
        for dir in [
            self.paths.files_dir(),
            self.paths.staging_dir(),
            self.paths.temp_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }

        let purged = transient::purge_dir(&self.paths.temp_dir())?;
        if purged > 0 {
            tracing::warn!(count = purged, "Removed stale transient plaintext from previous run");
        }
        Ok(())
    }

    /// Write-read-delete probe against the staging directory.
    pub fn health_check(&self) -> StorageResult<()> {
        let probe = self.paths.staging_dir().join(".health_check");
        let data = b"health_check_data";

        fs::write(&probe, data)?;
        let read = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read != data {
            return Err(StorageError::Io(std::io::Error::other(
                "health check data mismatch",
            )));
        }
        Ok(())
    }

    /// Encrypt `plaintext` and store it under `name`.
    ///
    /// Any existing entry with the same name is replaced. The ciphertext is
    /// written to the staging directory and renamed into place, so readers
    /// see either the old blob or the new one, never a partial write.
    pub fn put(&self, name: &FileName, plaintext: &[u8]) -> StorageResult<StoredFileInfo> {
        let ciphertext = self.codec.encrypt(plaintext)?;

        let staging = self
            .paths
            .staging_dir()
            .join(format!("{}.partial", uuid::Uuid::new_v4()));
        {
            let mut file = File::create(&staging)?;
            file.write_all(&ciphertext)?;
            file.sync_all()?;
        }

        let target = self.paths.stored_file(name);
        if let Err(e) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::info!(
            file = %name,
            plaintext_bytes = plaintext.len(),
            stored_bytes = ciphertext.len(),
            "Stored encrypted file"
        );

        Ok(StoredFileInfo {
            name: name.to_string(),
            size: ciphertext.len() as u64,
        })
    }

    /// List every stored file, sorted by name.
    pub fn list(&self) -> StorageResult<Vec<StoredFileInfo>> {
        let dir = self.paths.files_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(StoredFileInfo {
                    name: name.to_string(),
                    size: metadata.len(),
                });
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Check whether a file is stored under `name`.
    ///
    /// Lets callers answer "not found" without reading the blob.
    pub fn contains(&self, name: &FileName) -> bool {
        self.paths.stored_file(name).is_file()
    }

    /// Read and decrypt the file stored under `name`.
    ///
    /// # Errors
    /// `StorageError::NotFound` if nothing is stored under `name`;
    /// `StorageError::Decryption` if the blob does not open under the
    /// current key.
    pub fn get(&self, name: &FileName) -> StorageResult<Vec<u8>> {
        let path = self.paths.stored_file(name);
        let ciphertext = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.codec.decrypt(&ciphertext)
    }

    /// Write a decrypted copy for download and return its cleanup guard.
    pub fn materialize(
        &self,
        name: &FileName,
        plaintext: &[u8],
    ) -> StorageResult<TransientPlaintext> {
        let path = self.paths.temp_dir().join(uuid::Uuid::new_v4().to_string());
        // Guard first, so a failed write still removes whatever was created.
        let guard = TransientPlaintext::new(path, name.clone(), plaintext.len() as u64);
        write_private(guard.path(), plaintext)?;
        Ok(guard)
    }
}

/// Write a file readable only by the service user.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.flush()
}
