//! qp-server: the quillpost HTTP API.
//!
//! This crate ties the other qp-* crates into a running server. It provides:
//!
//! - Axum-based HTTP API with bearer-token authentication and rate limiting
//! - Registration, login and token verification
//! - Author-owned post mutations with image upload and cleanup
//! - Contact form relay over SMTP
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod password;
pub mod router;
pub mod routes;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod token;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use qp_core::config::Config;
use qp_media::{LocalMediaStore, MediaStore};

use crate::context::AppContext;

/// Start the quillpost server.
///
/// Opens the database, builds the media store and mailer, and serves HTTP
/// until SIGINT or SIGTERM.
pub async fn start(config: Config) -> qp_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = qp_db::pool::init_pool(
        &db_str,
        Duration::from_secs(config.server.db_connection_timeout_secs),
    )?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        &config.media.storage_dir,
        config.media.public_base_url.clone(),
    )?);
    let mailer = mailer::build_mailer(&config.mail)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| qp_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, config, media, mailer)?;
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| qp_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
