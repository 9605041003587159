//! Listener lifecycle.

use std::future::Future;
use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bind the listening socket.
pub async fn bind(addr: &str) -> io::Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|e| {
        let hint = match e.kind() {
            io::ErrorKind::AddrInUse => "address already in use; is another instance running?",
            io::ErrorKind::PermissionDenied => "permission denied; use a port above 1024",
            _ => "bind failed",
        };
        io::Error::new(e.kind(), format!("Failed to bind to {}: {} ({})", addr, hint, e))
    })
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
pub async fn run<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
