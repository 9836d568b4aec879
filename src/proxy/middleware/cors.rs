use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS: any origin, any request header (the CSRF headers included)
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
