pub mod client;

pub use client::{TogglClient, UpstreamError};
