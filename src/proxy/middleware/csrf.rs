//! CSRF gate for the proxy route
//!
//! Checks the `X-CSRF-Token` / `X-Session-Id` pair against the store before
//! the wrapped handler runs. Rejected requests never reach the upstream.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::modules::csrf::CsrfVerdict;
use crate::proxy::error::GatewayError;
use crate::proxy::server::AppState;

pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Non-empty header value, if present and valid ASCII
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Short, log-safe form of a session id
pub(crate) fn session_prefix(session_id: &str) -> String {
    session_id.chars().take(8).collect()
}

/// Map a store verdict onto the gateway's rejection taxonomy
pub fn verdict_to_result(verdict: CsrfVerdict) -> Result<(), GatewayError> {
    match verdict {
        CsrfVerdict::Valid => Ok(()),
        CsrfVerdict::Missing | CsrfVerdict::Mismatch => Err(GatewayError::CsrfInvalid),
        CsrfVerdict::Expired => Err(GatewayError::CsrfExpired),
    }
}

pub async fn csrf_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let (token, session_id) = match (
        header_value(headers, CSRF_TOKEN_HEADER),
        header_value(headers, SESSION_ID_HEADER),
    ) {
        (Some(token), Some(session_id)) => (token.to_string(), session_id.to_string()),
        _ => {
            tracing::warn!("csrf_guard: token or session header missing");
            return GatewayError::CsrfMissing.into_response();
        }
    };

    let verdict = state.csrf_store.verify(&session_id, &token).await;
    if let Err(err) = verdict_to_result(verdict) {
        tracing::warn!(
            "csrf_guard: rejected session {}.. ({:?})",
            session_prefix(&session_id),
            verdict
        );
        return err.into_response();
    }

    tracing::debug!("csrf_guard: session {}.. verified", session_prefix(&session_id));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_verdict_mapping() {
        assert!(verdict_to_result(CsrfVerdict::Valid).is_ok());
        assert!(matches!(
            verdict_to_result(CsrfVerdict::Missing),
            Err(GatewayError::CsrfInvalid)
        ));
        assert!(matches!(
            verdict_to_result(CsrfVerdict::Mismatch),
            Err(GatewayError::CsrfInvalid)
        ));
        assert!(matches!(
            verdict_to_result(CsrfVerdict::Expired),
            Err(GatewayError::CsrfExpired)
        ));
    }

    #[test]
    fn test_empty_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_TOKEN_HEADER, HeaderValue::from_static(""));
        headers.insert(SESSION_ID_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(header_value(&headers, CSRF_TOKEN_HEADER), None);
        assert_eq!(header_value(&headers, SESSION_ID_HEADER), Some("abc"));
        assert_eq!(header_value(&headers, "x-other"), None);
    }

    #[test]
    fn test_session_prefix() {
        assert_eq!(session_prefix("0123456789abcdef"), "01234567");
        assert_eq!(session_prefix("abc"), "abc");
    }
}
