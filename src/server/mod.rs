//! HTTP surface: `GET /` upload form, `POST /` CSV scoring, `GET /health`.

mod error;
pub mod handlers;
mod state;

pub use error::ApiError;
pub use state::AppState;

use crate::config::ServiceConfig;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router around an already-loaded scorer.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::upload_form).post(handlers::predict_upload),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn run_server(
    config: &ServiceConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = config.bind_addr().parse()?;
    let app = create_router(state, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        max_upload_bytes = config.server.max_upload_bytes,
        "listening"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
