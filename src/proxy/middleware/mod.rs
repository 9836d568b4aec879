// Middleware module - Axum middleware

pub mod cors;
pub mod csrf;

pub use cors::cors_layer;
pub use csrf::csrf_guard;
