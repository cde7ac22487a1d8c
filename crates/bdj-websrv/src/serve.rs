//! Binding and graceful shutdown, shared by all three embedded servers.

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Serve `app` on `addr` until SIGINT/SIGTERM, plain HTTP.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Serve `app` on `addr` over TLS until SIGINT/SIGTERM.
pub async fn serve_tls(addr: SocketAddr, app: Router, tls: TlsFiles) -> std::io::Result<()> {
    let config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
    info!(%addr, "https server listening");
    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received interrupt, shutting down http server");
        }
        _ = terminate() => {
            info!("received terminate, shutting down http server");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
