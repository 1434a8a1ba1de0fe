// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies used by the REST API. Listing and log entries
//! are served directly from the storage types
//! ([`StoredFileInfo`](crate::storage::StoredFileInfo) and
//! [`LogEntry`](crate::storage::LogEntry)).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload` (documentation only).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// The file to store. Its filename becomes the storage name.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Response after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UploadResponse {
    /// Name the file was stored under.
    pub filename: String,
    /// Stored (ciphertext) size in bytes.
    pub size: u64,
    /// Message indicating success.
    pub message: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_response_serializes() {
        let json = serde_json::to_string(&MessageResponse::new("Download logged successfully"))
            .unwrap();
        assert_eq!(json, r#"{"message":"Download logged successfully"}"#);
    }

    #[test]
    fn upload_response_round_trips() {
        let response = UploadResponse {
            filename: "report.pdf".into(),
            size: 38,
            message: "File uploaded successfully".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: UploadResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }
}
