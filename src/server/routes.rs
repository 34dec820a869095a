use super::WebState;
use crate::common::ApiResponse;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub(super) async fn root() -> Redirect {
    Redirect::to("/login")
}

pub(super) async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[derive(Debug, Serialize)]
pub(super) struct DebugInfo {
    webui_initialized: bool,
    services: Vec<String>,
    started_at: DateTime<Utc>,
}

/// Which collaborators this server instance was wired with
pub(super) async fn debug_info(State(state): State<WebState>) -> ApiResponse<DebugInfo> {
    ApiResponse::success(DebugInfo {
        webui_initialized: true,
        services: state.collaborators.names(),
        started_at: state.started_at,
    })
}

pub(super) async fn not_found(uri: Uri) -> (StatusCode, &'static str) {
    tracing::warn!("404 Not Found: {}", uri);
    (StatusCode::NOT_FOUND, "Not Found")
}
