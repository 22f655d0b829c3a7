// Gateway — Route Handlers
// request/response bodies, ApiError, one handler per route

use super::html::build_status_html;
use super::AppState;
use crate::atoms::error::EngineError;
use crate::engine::whatsapp::normalize_recipient;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use log::{info, warn};
use serde::{Deserialize, Serialize};

// ── Bodies ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct StatusResponse {
    success: bool,
    ready: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct QrResponse {
    success: bool,
    ready: bool,
    qr: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LogoutResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SendResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ErrorResponse {
    error: String,
}

/// Body of `POST /api/send`. `phone` may be a JSON string or number.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub phone: PhoneInput,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PhoneInput {
    Text(String),
    Number(serde_json::Number),
}

impl PhoneInput {
    fn to_text(&self) -> String {
        match self {
            PhoneInput::Text(s) => s.clone(),
            PhoneInput::Number(n) => n.to_string(),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    /// Send attempted before the session is ready.
    NotReady,
    /// Body missing or not `{phone, message}`.
    BadRequest(String),
    /// The WhatsApp client failed; its message is returned as-is.
    Client(EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "WhatsApp not ready".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Client(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// ── Handlers ───────────────────────────────────────────────────────────

pub(super) async fn health() -> &'static str {
    "OK"
}

pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        ready: state.session.is_ready(),
    })
}

pub(super) async fn get_qr(State(state): State<AppState>) -> Json<QrResponse> {
    let snapshot = state.session.snapshot();
    Json(QrResponse {
        success: true,
        ready: snapshot.ready,
        qr: snapshot.qr,
    })
}

pub(super) async fn logout(State(state): State<AppState>) -> Result<Json<LogoutResponse>, ApiError> {
    state.client.logout().await.map_err(|e| {
        warn!("[server] Logout failed: {}", e);
        ApiError::Client(e)
    })?;
    state.session.reset_after_logout();
    info!("[server] Logged out");
    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out successfully".into(),
    }))
}

pub(super) async fn send(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    // Readiness first: a not-ready gateway answers 503 whatever the body.
    if !state.session.is_ready() {
        return Err(ApiError::NotReady);
    }
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let chat_id = normalize_recipient(&request.phone.to_text());
    state
        .client
        .send_message(&chat_id, &request.message)
        .await
        .map_err(|e| {
            warn!("[server] Send to {} failed: {}", chat_id, e);
            ApiError::Client(e)
        })?;

    Ok(Json(SendResponse { success: true }))
}

pub(super) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(build_status_html(state.session.is_ready()))
}
