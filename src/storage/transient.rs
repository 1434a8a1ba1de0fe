// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Short-lived decrypted copies of stored files.
//!
//! A [`TransientPlaintext`] owns a plaintext file on disk and removes it when
//! dropped. Download handlers move the guard into the response body, so the
//! file disappears once the body is fully sent or abandoned by the client.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::FileName;

/// Guard over a plaintext file that must not outlive its download.
#[derive(Debug)]
pub struct TransientPlaintext {
    path: PathBuf,
    name: FileName,
    len: u64,
}

impl TransientPlaintext {
    pub(super) fn new(path: PathBuf, name: FileName, len: u64) -> Self {
        Self { path, name, len }
    }

    /// Location of the decrypted copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plaintext length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for TransientPlaintext {
    fn drop(&mut self) {
        // Best-effort: a failed removal is logged, never surfaced to the client.
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(
                    file = %self.name,
                    path = %self.path.display(),
                    "Transient plaintext removed"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %self.name,
                    path = %self.path.display(),
                    "Failed to remove transient plaintext"
                );
            }
        }
    }
}

/// Remove every file left in the transient directory.
///
/// Called at startup: anything still there belongs to a process that died
/// mid-download. Returns how many files were removed.
pub fn purge_dir(dir: &Path) -> io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
