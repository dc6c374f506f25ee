//! HTTP serving shared by the three services.

use std::net::SocketAddr;

use axum::{Json, Router, response::IntoResponse};
use tokio::net::TcpListener;

/// `GET /health` for any service.
pub async fn health_check(service: &'static str) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": service,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Bind `0.0.0.0:<port>` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns error on bind or server failure.
pub async fn run_http(service: &'static str, router: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(service, "HTTP server listening on http://{}", addr);

    serve(listener, router).await?;

    tracing::info!(service, "HTTP server shut down");
    Ok(())
}

/// Serve on an already bound listener until Ctrl-C.
///
/// # Errors
///
/// Returns error on server failure.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
