// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Long-lived storage key: loaded from disk, or generated on first run.
//!
//! The key file holds the raw key bytes and nothing else. There is no
//! rotation: every blob in the store is sealed under this one key, so a key
//! file with an unexpected length is treated as fatal rather than replaced.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ring::rand::{SecureRandom, SystemRandom};

use super::{StorageError, StorageResult};

/// Key length for AES-256-GCM.
pub const KEY_LEN: usize = 32;

/// Symmetric key used for every encrypt/decrypt call.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    pub fn from_bytes(bytes: &[u8]) -> StorageResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            StorageError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, found {}",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Draw a fresh key from the system CSPRNG.
    pub fn generate() -> StorageResult<Self> {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut key)
            .map_err(|_| StorageError::InvalidKey("system RNG unavailable".to_string()))?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Owns the on-disk location of the storage key.
#[derive(Debug, Clone)]
pub struct KeyManager {
    path: PathBuf,
}

impl KeyManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the key, generating and persisting one if none exists yet.
    ///
    /// # Errors
    /// Fails if the key file cannot be read or written, or holds the wrong
    /// number of bytes. The service cannot start without a key.
    pub fn initialize(&self) -> StorageResult<EncryptionKey> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let key = EncryptionKey::from_bytes(&bytes)?;
                tracing::info!(path = %self.path.display(), "Storage key loaded");
                Ok(key)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let key = EncryptionKey::generate()?;
                self.persist(&key)?;
                tracing::info!(path = %self.path.display(), "Storage key generated");
                Ok(key)
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn persist(&self, key: &EncryptionKey) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(key.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
