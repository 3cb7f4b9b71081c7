//! REST API Server for the fintech advisor
//!
//! Exposes the conversation controller via HTTP endpoints.
//! Each session id maps to its own conversation state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conversation::{ConversationController, ConversationState};
use crate::error::AdvisorError;
use crate::state::SessionStore;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn error_response(error: AdvisorError) -> ApiResult {
    let status = match error {
        AdvisorError::EmptyInput => StatusCode::BAD_REQUEST,
        AdvisorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub controller: Arc<ConversationController>,
    pub sessions: Arc<dyn SessionStore>,
}

/// =============================
/// Helpers — Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Accept either a UUID or any opaque client string as a session id.
fn parse_session_id(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_else(|_| stable_uuid_from_string(value))
}

fn snapshot(session_id: Uuid, state: &ConversationState) -> serde_json::Value {
    serde_json::json!({
        "session_id": session_id,
        "phase": state.phase(),
        "goal": state.goal(),
        "broad_intent": state.broad_intent(),
        "progress": state.progress(),
        "questions": state.questions(),
        "suggestions": state.suggestions(),
        "messages": state.messages(),
    })
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    let session_id = match req.session_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => parse_session_id(id),
        _ => Uuid::new_v4(),
    };

    let shared = state.sessions.get_or_create(session_id).await;
    let mut conversation = shared.lock().await;

    info!(%session_id, phase = ?conversation.phase(), "Chat turn received");

    match state.controller.respond(&mut conversation, &req.message).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "session_id": session_id,
                "reply": reply,
                "phase": conversation.phase(),
                "progress": conversation.progress(),
            }))),
        ),
        Err(e) => {
            warn!(%session_id, "Chat turn rejected: {}", e);
            error_response(e)
        }
    }
}

/// =============================
/// Session Endpoints
/// =============================

async fn get_session(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let session_id = parse_session_id(&id);

    match state.sessions.get(session_id).await {
        Ok(shared) => {
            let conversation = shared.lock().await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(snapshot(session_id, &conversation))),
            )
        }
        Err(e) => error_response(e),
    }
}

async fn reset_session(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let session_id = parse_session_id(&id);
    let shared = match state.sessions.get(session_id).await {
        Ok(shared) => shared,
        Err(e) => return error_response(e),
    };
    let mut conversation = shared.lock().await;

    state.controller.reset(&mut conversation);
    info!(%session_id, "Session reset");

    (
        StatusCode::OK,
        Json(ApiResponse::success(snapshot(session_id, &conversation))),
    )
}

async fn delete_session(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let session_id = parse_session_id(&id);

    if !state.sessions.remove(session_id).await {
        return error_response(AdvisorError::SessionNotFound(session_id));
    }

    info!(%session_id, "Session deleted");
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({ "session_id": session_id }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(
    controller: Arc<ConversationController>,
    sessions: Arc<dyn SessionStore>,
) -> Router {
    let state = ApiState {
        controller,
        sessions,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    controller: Arc<ConversationController>,
    sessions: Arc<dyn SessionStore>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(controller, sessions);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
