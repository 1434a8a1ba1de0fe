// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by the key manager, cipher, file store and access log.

use std::io;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No stored file with this name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Name rejected before touching the filesystem
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// Persisted key is unusable
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Sealing failed (CSPRNG or AEAD failure)
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Ciphertext is malformed, truncated, or sealed under another key
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Access log line could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: StorageError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: nope");
    }

    #[test]
    fn display_includes_context() {
        assert_eq!(
            StorageError::NotFound("a.txt".into()).to_string(),
            "Not found: a.txt"
        );
        assert_eq!(
            StorageError::Decryption("authentication tag mismatch".into()).to_string(),
            "Decryption failed: authentication tag mismatch"
        );
    }
}
