// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upload, listing and download endpoints.
//!
//! Downloads decrypt the stored blob, record the access, and stream the
//! plaintext from a transient copy that is deleted when the response body is
//! dropped (fully sent, client gone, or send error).

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;

use crate::{
    error::ApiError,
    models::{UploadForm, UploadResponse},
    state::AppState,
    storage::{FileName, StorageError, StoredFileInfo, TransientPlaintext},
};

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File encrypted and stored", body = UploadResponse),
        (status = 400, description = "No file part, empty or invalid filename"),
        (status = 413, description = "Upload exceeds the configured size limit")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let raw_name = field.file_name().unwrap_or_default().to_string();
        if raw_name.is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }
        let name = FileName::parse(&raw_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        let files = state.files.clone();
        let stored = tokio::task::spawn_blocking(move || files.put(&name, &data)).await??;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                filename: stored.name,
                size: stored.size,
                message: "File uploaded successfully".to_string(),
            }),
        ));
    }

    Err(ApiError::bad_request("No file part"))
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    responses(
        (status = 200, description = "Stored files; sizes are ciphertext lengths", body = [StoredFileInfo])
    )
)]
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredFileInfo>>, ApiError> {
    let files = state.files.clone();
    Ok(Json(tokio::task::spawn_blocking(move || files.list()).await??))
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    params(
        ("filename" = String, Path, description = "Name of the stored file")
    ),
    tag = "Files",
    responses(
        (status = 200, description = "Decrypted file contents as an `application/octet-stream` attachment"),
        (status = 400, description = "Invalid filename"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Stored file could not be decrypted")
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = FileName::parse(&filename)?;
    let disposition = content_disposition(&name)?;

    let files = state.files.clone();
    let lookup = name.clone();
    let transient = tokio::task::spawn_blocking(move || {
        if !files.contains(&lookup) {
            return Err(StorageError::NotFound(lookup.to_string()));
        }
        let plaintext = files.get(&lookup)?;
        files.materialize(&lookup, &plaintext)
    })
    .await??;

    let file = tokio::fs::File::open(transient.path())
        .await
        .map_err(StorageError::from)?;
    let content_length = HeaderValue::from(transient.len());

    // Only a download that is about to be served gets logged. The download
    // itself still goes out if the log is unwritable.
    let access_log = state.access_log.clone();
    let logged = name.clone();
    match tokio::task::spawn_blocking(move || access_log.record_now(&logged)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!(error = %e, file = %name, "Failed to record download"),
        Err(e) => tracing::error!(error = %e, file = %name, "Download log task failed"),
    }

    let body = Body::from_stream(ReaderStream::new(TransientReader {
        file,
        _plaintext: transient,
    }));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, content_length),
        ],
        body,
    )
        .into_response())
}

/// Reads a transient plaintext file and deletes it when dropped.
struct TransientReader {
    file: tokio::fs::File,
    _plaintext: TransientPlaintext,
}

impl AsyncRead for TransientReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(name: &FileName) -> Result<HeaderValue, ApiError> {
    let fallback: String = name
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(name.as_str().len());
    for byte in name.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .map_err(|_| ApiError::internal("Failed to build Content-Disposition header"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use axum::body::to_bytes;
    use tempfile::TempDir;

    fn test_state() -> (TempDir, AppState) {
        let temp = TempDir::new().unwrap();
        let state = AppState::open(StoragePaths::new(temp.path())).unwrap();
        (temp, state)
    }

    #[test]
    fn disposition_for_ascii_name() {
        let value = content_disposition(&FileName::parse("report.pdf").unwrap()).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
    }

    #[test]
    fn disposition_escapes_quotes_and_unicode() {
        let name = FileName::parse("caf\u{e9} \"menu\".txt").unwrap();
        let value = content_disposition(&name).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"caf_ _menu_.txt\"; filename*=UTF-8''caf%C3%A9%20%22menu%22.txt"
        );
    }

    #[tokio::test]
    async fn list_files_reports_stored_entries() {
        let (_temp, state) = test_state();
        state
            .files
            .put(&FileName::parse("a.txt").unwrap(), b"alpha")
            .unwrap();

        let Json(files) = list_files(State(state.clone()))
            .await
            .expect("listing succeeds");

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].size, 5 + crate::storage::CipherCodec::overhead() as u64);
    }

    #[tokio::test]
    async fn download_streams_plaintext_and_cleans_up() {
        let (_temp, state) = test_state();
        let name = FileName::parse("notes.txt").unwrap();
        state.files.put(&name, b"meeting notes").unwrap();

        let response = download_file(State(state.clone()), Path("notes.txt".to_string()))
            .await
            .expect("download succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH].to_str().unwrap(),
            "13"
        );

        // The transient copy exists until the body is consumed.
        let temp_dir = state.files.paths().temp_dir();
        assert_eq!(std::fs::read_dir(&temp_dir).unwrap().count(), 1);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"meeting notes");
        assert_eq!(std::fs::read_dir(&temp_dir).unwrap().count(), 0);

        let log = state.access_log.read_all().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].filename, "notes.txt");
    }

    #[tokio::test]
    async fn abandoned_download_still_cleans_up() {
        let (_temp, state) = test_state();
        state
            .files
            .put(&FileName::parse("big.bin").unwrap(), &[7u8; 4096])
            .unwrap();

        let response = download_file(State(state.clone()), Path("big.bin".to_string()))
            .await
            .expect("download succeeds");
        drop(response);

        let temp_dir = state.files.paths().temp_dir();
        assert_eq!(std::fs::read_dir(&temp_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn download_missing_is_not_found() {
        let (_temp, state) = test_state();

        let Err(err) = download_file(State(state.clone()), Path("nope.pdf".to_string())).await
        else {
            panic!("expected not found");
        };

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(state.access_log.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_rejects_traversal() {
        let (_temp, state) = test_state();

        let Err(err) = download_file(State(state), Path("../key.key".to_string())).await else {
            panic!("expected invalid name");
        };

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_transient_write_is_not_logged() {
        let (_temp, state) = test_state();
        state
            .files
            .put(&FileName::parse("a.txt").unwrap(), b"alpha")
            .unwrap();

        // A regular file where the transient directory should be makes the
        // plaintext copy impossible to write.
        let temp_dir = state.files.paths().temp_dir();
        std::fs::remove_dir_all(&temp_dir).unwrap();
        std::fs::write(&temp_dir, b"not a directory").unwrap();

        let Err(err) = download_file(State(state.clone()), Path("a.txt".to_string())).await else {
            panic!("expected storage error");
        };

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.access_log.read_all().unwrap().is_empty());
    }
}
