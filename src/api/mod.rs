// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{MessageResponse, UploadForm, UploadResponse},
    state::AppState,
    storage::{LogEntry, StoredFileInfo},
};

pub mod access_log;
pub mod files;
pub mod health;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let routes = Router::new()
        .route("/upload", post(files::upload_file))
        .route("/files", get(files::list_files))
        .route("/download/{filename}", get(files::download_file))
        .route("/download-log", get(access_log::download_log))
        .route(
            "/download-success/{filename}",
            post(access_log::download_success),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(trace)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        files::upload_file,
        files::list_files,
        files::download_file,
        access_log::download_log,
        access_log::download_success,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            StoredFileInfo,
            LogEntry,
            UploadForm,
            UploadResponse,
            MessageResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Files", description = "Encrypted upload, listing and download"),
        (name = "Download Log", description = "Append-only record of downloads"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
