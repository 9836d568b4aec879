use axum::{extract::State, response::IntoResponse, Json};

use crate::proxy::middleware::csrf::session_prefix;
use crate::proxy::server::AppState;

/// Issue a fresh token/session pair
pub async fn issue_csrf_token(State(state): State<AppState>) -> impl IntoResponse {
    let grant = state.csrf_store.issue().await;
    tracing::debug!("Issued CSRF grant for session {}..", session_prefix(&grant.session_id));
    Json(grant)
}
