//! sg-server: the HTTP surface of streamgate.
//!
//! - `GET /health` liveness probe
//! - `GET /api/videos` lists resources with freshly signed access URLs
//! - `GET /api/stream/{resource_id}` validates the signed URL and streams
//!   the requested byte window
//!
//! Every request is one task; the only shared state is the immutable
//! [`AppContext`] and the transfer counters.

pub mod context;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod streaming;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use sg_core::config::Config;

pub use context::AppContext;
pub use router::build_router;
pub use streaming::{TransferStats, TransferTracker};

/// Path prefix under which access URLs are issued.
pub const STREAM_BASE: &str = "/api/stream";

/// Start the streamgate server and run until SIGINT/SIGTERM.
///
/// Fails before binding when no signing secret is configured.
pub async fn start(config: Config) -> sg_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let ctx = AppContext::from_config(config)?;
    let app = build_router(ctx);

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| sg_core::Error::Internal(format!("Failed to bind to {host}:{port}: {e}")))?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting server on {addr}");
    }

    serve(listener, app, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// The peer address is made available to handlers through `ConnectInfo`,
/// which identity resolution falls back to.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> sg_core::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
