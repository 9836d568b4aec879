//! Gateway error taxonomy and its JSON rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::proxy::upstream::client::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("CSRF token missing")]
    CsrfMissing,

    #[error("Invalid CSRF token")]
    CsrfInvalid,

    #[error("CSRF token expired")]
    CsrfExpired,

    #[error("Missing required parameters")]
    Validation,

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: String,
    },

    /// Upstream could not be reached or its body could not be parsed
    #[error("Failed to fetch data from Toggl")]
    Transport(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CsrfMissing | Self::CsrfInvalid | Self::CsrfExpired => StatusCode::FORBIDDEN,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason for CSRF rejections
    pub fn csrf_reason(&self) -> Option<&'static str> {
        match self {
            Self::CsrfMissing => Some("missing"),
            Self::CsrfInvalid => Some("invalid"),
            Self::CsrfExpired => Some("expired"),
            _ => None,
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, reason, body } => Self::Upstream {
                status,
                message: format!("Toggl API Error: {} {}", status, reason)
                    .trim_end()
                    .to_string(),
                details: body,
            },
            UpstreamError::Transport(details) => Self::Transport(details),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Upstream { message, details, .. } => json!({
                "error": message,
                "details": details,
            }),
            Self::Transport(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => match self.csrf_reason() {
                Some(reason) => json!({ "error": self.to_string(), "reason": reason }),
                None => json!({ "error": self.to_string() }),
            },
        };
        (status, Json(body)).into_response()
    }
}
