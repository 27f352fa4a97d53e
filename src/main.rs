use std::net::SocketAddr;
use std::sync::Arc;

use axum::{ServiceExt, extract::Request};
use bookstore::config::{DatabaseConfig, ServerConfig, Settings};
use bookstore::db::{PgBookStorage, connect_lazy};
use bookstore::{BookstoreState, bookstore_app};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();
    let loglevel = ServerConfig::from_settings(&settings)
        .map(|s| s.loglevel)
        .unwrap_or_else(|_| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let settings = bookstore::vault::bootstrap_secrets(settings)
        .await
        .inspect_err(|e| error!(error = %e, "secret bootstrap failed"))?;

    let server = ServerConfig::from_settings(&settings)?;
    let db = DatabaseConfig::from_settings(&settings);
    info!(
        db_host = %db.host,
        db_port = %db.port,
        db_name = %db.name,
        db_ssl = %db.ssl,
        loglevel = %server.loglevel
    );

    let pool = connect_lazy(&db)?;
    let storage = Arc::new(PgBookStorage::new(pool));
    let state = BookstoreState::new(storage.clone(), storage);
    let app = bookstore_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM; in-flight requests are drained before exit.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
