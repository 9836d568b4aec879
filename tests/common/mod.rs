//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

use t2n_server::modules::config::{normalize_base_path, ServerConfig};
use t2n_server::proxy::{build_router, AppState};

pub const SHELL_HTML: &str =
    r#"<html><head><link rel="icon" href="{{BASE_PATH}}/t2n-favicon.png"></head><body data-base="{{BASE_PATH}}"></body></html>"#;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Static directory with the shell and both icons
pub fn static_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_static_files(dir.path());
    dir
}

pub fn write_static_files(dir: &Path) {
    std::fs::write(dir.join("index.html"), SHELL_HTML).unwrap();
    std::fs::write(dir.join("t2n-favicon.png"), PNG_BYTES).unwrap();
    std::fs::write(dir.join("github.png"), PNG_BYTES).unwrap();
}

pub fn test_config(upstream_url: &str, base_path: &str, static_dir: &Path) -> ServerConfig {
    ServerConfig {
        base_path: normalize_base_path(base_path),
        static_dir: static_dir.to_path_buf(),
        upstream_base_url: upstream_url.to_string(),
        request_timeout: 5,
        ..ServerConfig::default()
    }
}

pub fn test_state(upstream_url: &str, base_path: &str, static_dir: &Path) -> (AppState, Router) {
    test_state_with_timeout(upstream_url, base_path, static_dir, 5)
}

pub fn test_state_with_timeout(
    upstream_url: &str,
    base_path: &str,
    static_dir: &Path,
    request_timeout: u64,
) -> (AppState, Router) {
    let config = ServerConfig {
        request_timeout,
        ..test_config(upstream_url, base_path, static_dir)
    };
    let state = AppState::new(config).unwrap();
    let app = build_router(state.clone());
    (state, app)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
