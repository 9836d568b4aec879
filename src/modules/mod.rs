pub mod config;
pub mod csrf;
pub mod logger;

pub use config::ServerConfig;
pub use csrf::{CsrfGrant, CsrfStore, CsrfVerdict};
