//! Resource API server: reads config from env (and `.env`), opens the SQLite store,
//! serves `/health`, `/ready`, `/version` and `/api/resources`, closes the store on shutdown.
//!
//! Run from repo root: `cargo run -p resource-server`

use resource_api::{app, AppState, ServerConfig, SqliteStore, RESOURCES_PATH};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resource_api=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = Arc::new(SqliteStore::connect(&config.database_url, config.max_connections).await?);
    let state = AppState::new(store.clone());
    let router = app(state, config.body_limit_bytes);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    tracing::info!("listening on http://{}", addr);
    tracing::info!("resource endpoints at http://{}{}", addr, RESOURCES_PATH);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
