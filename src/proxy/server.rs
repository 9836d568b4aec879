use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::SecondsFormat;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::modules::config::ServerConfig;
use crate::modules::csrf::CsrfStore;
use crate::proxy::upstream::client::TogglClient;

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Outstanding CSRF grants
    pub csrf_store: Arc<CsrfStore>,
    pub upstream: Arc<TogglClient>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        let upstream = TogglClient::new(&config.upstream_base_url, config.request_timeout)?;
        let csrf_store = CsrfStore::new(config.csrf_ttl_secs);

        Ok(Self {
            config: Arc::new(config),
            csrf_store: Arc::new(csrf_store),
            upstream: Arc::new(upstream),
        })
    }
}

/// Join the base path and a route path
fn route_path(base_path: &str, path: &str) -> String {
    format!("{}{}", base_path, path)
}

/// Build the application router; every route is mounted under `config.base_path`
pub fn build_router(state: AppState) -> Router {
    use crate::proxy::handlers;

    let base = state.config.base_path.clone();

    let mut app = Router::new()
        .route(&route_path(&base, "/"), get(handlers::assets::serve_shell))
        .route(
            &route_path(&base, "/t2n-favicon.png"),
            get(handlers::assets::serve_favicon),
        )
        .route(
            &route_path(&base, "/github.png"),
            get(handlers::assets::serve_github_icon),
        )
        .route(
            &route_path(&base, "/api/csrf-token"),
            get(handlers::csrf::issue_csrf_token),
        )
        .route(
            &route_path(&base, "/api/toggl/time-entries"),
            post(handlers::toggl::handle_time_entries).route_layer(
                axum::middleware::from_fn_with_state(
                    state.clone(),
                    crate::proxy::middleware::csrf_guard,
                ),
            ),
        )
        .route(&route_path(&base, "/health"), get(health_check_handler));

    // "/app" as well as "/app/" reaches the shell
    if !base.is_empty() {
        app = app.route(&base, get(handlers::assets::serve_shell));
    }

    app.layer(crate::proxy::middleware::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    /// Bind and start serving in a background task
    pub async fn start(state: AppState) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let addr = format!("{}:{}", state.config.bind_address, state.config.port);
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;

        tracing::info!("Server started at http://{}", addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling ended or error: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Server stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((Self { shutdown_tx: Some(shutdown_tx) }, handle))
    }

    /// Stop the server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler(State(state): State<AppState>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "basePath": state.config.display_base_path(),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path() {
        assert_eq!(route_path("", "/"), "/");
        assert_eq!(route_path("", "/health"), "/health");
        assert_eq!(route_path("/t2n", "/"), "/t2n/");
        assert_eq!(route_path("/t2n", "/api/csrf-token"), "/t2n/api/csrf-token");
    }
}
