//! Axum adapter around an [`Engine`].
//!
//! # Responsibilities
//! - Route every path and method to the engine
//! - Hand the peer IP (no port) to the blacklist
//! - Map engine errors to status codes

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;

/// Build a router that sends every request through `engine`.
///
/// Needs `ConnectInfo<SocketAddr>`; see [`serve`].
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/{*path}", any(proxy_handler))
        .route("/", any(proxy_handler))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
}

/// Serve `engine` on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    engine: Arc<Engine>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    let app = router(engine).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn proxy_handler(
    State(engine): State<Arc<Engine>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    match engine.dispatch(&addr.ip().to_string(), request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
