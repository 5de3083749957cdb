use marksift_server::{AppState, ServerConfig, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marksift_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let pipeline = config.pipeline()?;
    info!(profiles = pipeline.profiles().len(), threshold = config.fallback_threshold, "pipeline ready");

    let app = router(AppState::new(pipeline), config.request_timeout());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
