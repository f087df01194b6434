//! HTTP server.
//!
//! Routes:
//! - `GET /asn/:ip` - autonomous system of an address
//! - `GET /asn/reload` - reload the ASN database from its configured file
//! - `GET /geo/:ip` - location of an address
//! - `GET /geo/reload` - reload the City database from its configured file
//! - `GET /ipinfo/:ip` - AS and location combined
//! - `GET /status` - databases currently being served
//!
//! Lookup and reload failures are answered with status 500 and a JSON `error`.

mod handlers;
mod middleware;
mod types;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use handlers::{
    asn_handler, asn_reload_handler, geo_handler, geo_reload_handler, ipinfo_handler,
    status_handler,
};
pub use types::AppState;

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/asn/reload", get(asn_reload_handler))
        .route("/asn/:ip", get(asn_handler))
        .route("/geo/reload", get(geo_reload_handler))
        .route("/geo/:ip", get(geo_handler))
        .route("/ipinfo/:ip", get(ipinfo_handler))
        .route("/status", get(status_handler))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(state)
}

/// Binds the first of `addrs` that accepts and serves until `shutdown` completes
pub async fn start_server<F>(
    addrs: &[SocketAddr],
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addrs)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to {:?}: {}", addrs, e))?;

    serve(listener, state, shutdown).await
}

/// Serves on an already bound listener until `shutdown` completes
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    log::info!("Listening on http://{}/", local_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    log::info!("Server on {} stopped", local_addr);
    Ok(())
}
