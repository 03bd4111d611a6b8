//! Liveness endpoint for the hosting platform.
//!
//! - `GET /` and `GET /health` answer 200 with a static body.
//!
//! Handlers touch no market state and make no upstream calls.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const BODY: &str = "Market digest bot is running";

async fn alive() -> &'static str {
    BODY
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(alive))
}

/// Serves the liveness routes on `listener` until `cancel` fires.
pub async fn serve(listener: TcpListener, cancel: CancellationToken) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "health server listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("health server stopped");
    Ok(())
}
