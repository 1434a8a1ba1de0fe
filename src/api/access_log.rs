// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Download log endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::MessageResponse,
    state::AppState,
    storage::{FileName, LogEntry},
};

#[utoipa::path(
    get,
    path = "/download-log",
    tag = "Download Log",
    responses(
        (status = 200, description = "Download events in the order they happened", body = [LogEntry])
    )
)]
pub async fn download_log(
    State(state): State<AppState>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let access_log = state.access_log.clone();
    Ok(Json(
        tokio::task::spawn_blocking(move || access_log.read_all()).await??,
    ))
}

/// Record a completed download reported by the client.
///
/// Independent of `GET /download/{filename}`, which logs on its own; the
/// file does not have to exist.
#[utoipa::path(
    post,
    path = "/download-success/{filename}",
    params(
        ("filename" = String, Path, description = "Name of the downloaded file")
    ),
    tag = "Download Log",
    responses(
        (status = 200, description = "Download logged", body = MessageResponse),
        (status = 400, description = "Invalid filename")
    )
)]
pub async fn download_success(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = FileName::parse(&filename)?;
    let access_log = state.access_log.clone();
    tokio::task::spawn_blocking(move || access_log.record_now(&name)).await??;
    Ok(Json(MessageResponse::new("Download logged successfully")))
}
