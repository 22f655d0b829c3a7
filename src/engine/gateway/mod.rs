// Gateway — HTTP Surface
//
// axum router over the shared session state and the WhatsApp client.
//
// Routes:
//   GET  /             → HTML status fragment
//   GET  /health       → "OK" (liveness only)
//   GET  /api/status   → { success, ready }
//   GET  /api/get-qr   → { success, ready, qr }
//   POST /api/logout   → { success, message } | 500 { error }
//   POST /api/send     → { success } | 503 / 400 / 500 { error }
//
// CORS is fully permissive; the gateway is meant to sit behind a frontend on
// another origin.

mod html;
mod routes;

use crate::atoms::error::EngineResult;
use crate::engine::whatsapp::{SharedSession, WhatsAppClient};
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use routes::{ApiError, SendRequest};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub client: Arc<dyn WhatsAppClient>,
}

impl AppState {
    pub fn new(session: SharedSession, client: Arc<dyn WhatsAppClient>) -> Self {
        AppState { session, client }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/status", get(routes::status))
        .route("/api/get-qr", get(routes::get_qr))
        .route("/api/logout", post(routes::logout))
        .route("/api/send", post(routes::send))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<F>(addr: &str, state: AppState, shutdown: F) -> EngineResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind HTTP listener on {}: {}", addr, e))?;
    info!("[server] Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("[server] HTTP listener stopped");
    Ok(())
}
