// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::storage::{
    AccessLog, CipherCodec, FileStore, KeyManager, StoragePaths, StorageResult,
};

#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileStore>,
    pub access_log: Arc<AccessLog>,
}

impl AppState {
    pub fn new(files: FileStore, access_log: AccessLog) -> Self {
        Self {
            files: Arc::new(files),
            access_log: Arc::new(access_log),
        }
    }

    /// Load (or create) the key and open the store under `paths`.
    ///
    /// Runs once at startup; any error here means the service cannot serve.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        let key = KeyManager::new(paths.key_file()).initialize()?;
        let codec = CipherCodec::new(&key)?;

        let access_log = AccessLog::new(paths.access_log_file());
        let files = FileStore::new(paths, codec);
        files.initialize()?;

        Ok(Self::new(files, access_log))
    }
}
