use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::any};
use tracing::info;

use aare_core::VerificationService;

mod cors;
mod dto;
mod error;
mod handlers;

#[cfg(test)]
mod tests;

pub use cors::{ALLOWED_ORIGINS, PRIMARY_ORIGIN, allowed_origin};

/// Largest request body the endpoint buffers, matching the hosting platform's cap.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub(crate) struct WebState {
    pub(crate) service: Arc<VerificationService>,
}

impl WebState {
    fn new(service: Arc<VerificationService>) -> Self {
        Self { service }
    }
}

/// Start the verification endpoint and block until shutdown.
///
/// # Errors
/// Returns an error when the runtime cannot be created, the socket cannot be
/// bound, or the server exits with a runtime failure.
pub fn serve_web(service: VerificationService, host: &str, port: u16) -> Result<()> {
    // Keep one handle outside the runtime so the blocking storage client is
    // never dropped on an async worker.
    let state = WebState::new(Arc::new(service));
    let router_state = state.clone();
    let bind_addr = format!("{host}:{port}");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build web runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind web server at {bind_addr}"))?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "verification endpoint listening");

        axum::serve(listener, app_router(router_state))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("web server failed")
    })
}

pub(crate) fn app_router(state: WebState) -> Router {
    router_with_body_limit(state, MAX_BODY_BYTES)
}

pub(crate) fn router_with_body_limit(state: WebState, body_limit: usize) -> Router {
    Router::new()
        .route("/", any(handlers::verify))
        .route("/verify", any(handlers::verify))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(cors::cors_headers_middleware))
        .with_state(state)
}
