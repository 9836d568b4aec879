//! Application shell and icons

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::io::ErrorKind;

use crate::proxy::server::AppState;

/// Build-time placeholder replaced with the configured base path
pub const BASE_PATH_PLACEHOLDER: &str = "{{BASE_PATH}}";

pub const SHELL_CACHE_CONTROL: &str = "public, max-age=604800"; // 1 week
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable"; // 1 year

pub const FAVICON_FILE: &str = "t2n-favicon.png";
pub const GITHUB_ICON_FILE: &str = "github.png";
const SHELL_FILE: &str = "index.html";

pub fn inject_base_path(html: &str, base_path: &str) -> String {
    html.replace(BASE_PATH_PLACEHOLDER, base_path)
}

/// Serve index.html with the base path injected
pub async fn serve_shell(State(state): State<AppState>) -> Response {
    let path = state.config.static_dir.join(SHELL_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CACHE_CONTROL, SHELL_CACHE_CONTROL),
            ],
            inject_base_path(&html, &state.config.base_path),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading page").into_response()
        }
    }
}

pub async fn serve_favicon(State(state): State<AppState>) -> Response {
    serve_png(&state, FAVICON_FILE).await
}

pub async fn serve_github_icon(State(state): State<AppState>) -> Response {
    serve_png(&state, GITHUB_ICON_FILE).await
}

async fn serve_png(state: &AppState, file_name: &str) -> Response {
    let path = state.config.static_dir.join(file_name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Static asset not found: {}", path.display());
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
