// proxy module - CSRF-guarded Toggl gateway and static shell server

pub mod error;
pub mod handlers;    // Endpoint handlers
pub mod middleware;  // Axum middleware
pub mod server;
pub mod upstream;    // Toggl client

pub use error::GatewayError;
pub use server::{build_router, AppState, AxumServer};
