use t2n_server::modules;
use t2n_server::proxy;

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = modules::config::load_server_config()?;

    modules::logger::init_logger(config.log_dir.as_deref());

    tracing::info!(
        "base path: {} | static dir: {} | upstream: {}",
        config.display_base_path(),
        config.static_dir.display(),
        config.upstream_base_url
    );

    let state = proxy::AppState::new(config.clone())?;
    let (server, handle) = proxy::AxumServer::start(state)
        .await
        .map_err(|e| format!("failed to start server: {}", e))?;

    tracing::info!(
        "t2n-server running on http://{}:{}{}",
        config.bind_address,
        config.port,
        config.base_path
    );
    tracing::info!(
        "CSRF tokens expire {} seconds after issuance",
        config.csrf_ttl_secs
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {}", e))?;

    tracing::info!("shutdown requested, stopping server...");
    server.stop();
    if let Err(e) = handle.await {
        tracing::error!("server task ended abnormally: {}", e);
    }

    Ok(())
}
