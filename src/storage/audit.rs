// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Download access log.
//!
//! Every download is appended to a single JSON Lines file, one object per
//! line, in the order the downloads happened. Entries are never rewritten or
//! removed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FileName, StorageError, StorageResult};

/// Timestamp layout for log entries (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single download record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LogEntry {
    /// Name of the downloaded file.
    pub filename: String,
    /// When the download happened, formatted as `YYYY-MM-DD HH:MM:SS`.
    #[schema(example = "2026-10-19 14:03:55")]
    pub timestamp: String,
}

impl LogEntry {
    pub fn new<Tz: TimeZone>(filename: &FileName, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            filename: filename.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Parse the timestamp back into a naive local date-time.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// Append-only log of download events.
#[derive(Debug)]
pub struct AccessLog {
    path: PathBuf,
    // Serializes appends from concurrent requests within this process.
    write_lock: Mutex<()>,
}

impl AccessLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry for `filename` at time `at`.
    pub fn append<Tz: TimeZone>(
        &self,
        filename: &FileName,
        at: &DateTime<Tz>,
    ) -> StorageResult<LogEntry>
    where
        Tz::Offset: std::fmt::Display,
    {
        let entry = LogEntry::new(filename, at);

        let mut line = serde_json::to_string(&entry).map_err(|e| {
            StorageError::Serialization(format!("Failed to serialize log entry: {e}"))
        })?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        tracing::info!(file = %filename, timestamp = %entry.timestamp, "Download logged");
        Ok(entry)
    }

    /// Append one entry for `filename` at the current local time.
    pub fn record_now(&self, filename: &FileName) -> StorageResult<LogEntry> {
        self.append(filename, &Local::now())
    }

    /// Read every entry in append order.
    ///
    /// A log that does not exist yet reads as empty. Lines that do not parse
    /// are skipped with a warning.
    pub fn read_all(&self) -> StorageResult<Vec<LogEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        line = index + 1,
                        error = %e,
                        "Skipping malformed access log line"
                    );
                }
            }
        }

        Ok(entries)
    }
}
