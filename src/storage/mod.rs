// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encrypted Storage Module
//!
//! This module owns everything that touches the disk: the storage key, the
//! encrypted file store, transient plaintext for downloads, and the access
//! log.
//!
//! ## Security Model
//!
//! - Uploaded bytes are sealed with AES-256-GCM before they are written
//! - The durable copy of every file is ciphertext
//! - Decrypted copies exist only while a download response is in flight
//! - File names are validated before they become path components
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   key.key               # Raw 32-byte key (NEVER exposed via API)
//!   server_files/{name}   # Ciphertext blobs
//!   incoming/             # Staging area, renamed into server_files/
//!   temp/                 # Transient plaintext for in-flight downloads
//!   download_log.txt      # Access log (JSON Lines)
//! ```

pub mod audit;
pub mod cipher;
pub mod encrypted_fs;
pub mod error;
pub mod keys;
pub mod names;
pub mod paths;
pub mod transient;

pub use audit::{AccessLog, LogEntry};
pub use cipher::CipherCodec;
pub use encrypted_fs::{FileStore, StoredFileInfo};
pub use error::{StorageError, StorageResult};
pub use keys::{EncryptionKey, KeyManager};
pub use names::FileName;
pub use paths::StoragePaths;
pub use transient::TransientPlaintext;
