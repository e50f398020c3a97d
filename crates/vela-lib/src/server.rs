//! HTTP API for the vela chat backend.
//!
//! Runs on port 2004 by default. CORS-permissive so a browser widget served
//! from another origin can call it.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vela_core::types::{HealthStatus, ResponseEnvelope};

use crate::chat::ChatService;
use crate::error::ServiceError;
use crate::speech::{AUDIO_MPEG, SpeechClient};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub speech: Arc<SpeechClient>,
}

impl AppState {
    pub fn new(chat: ChatService, speech: SpeechClient) -> Self {
        Self {
            chat: Arc::new(chat),
            speech: Arc::new(speech),
        }
    }
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/api/speak", post(speak).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct TextRequest {
    #[serde(default)]
    text: Option<String>,
}

/// Pull a non-blank `text` out of the request body.
fn require_text(body: Result<Json<TextRequest>, JsonRejection>) -> Result<String, ServiceError> {
    let Json(req) = body.map_err(|rejection| {
        ServiceError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    })?;
    match req.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ServiceError::BadRequest("text is required".into())),
    }
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, ServiceError> {
    let text = require_text(body)?;
    let envelope = state.chat.answer(&text).await?;
    Ok(Json(envelope))
}

async fn speak(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let text = require_text(body)?;
    let audio = state.speech.synthesize(&text).await?;
    Ok((
        [(header::CONTENT_TYPE, AUDIO_MPEG)],
        Body::from_stream(audio.into_stream()),
    )
        .into_response())
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        ok: true,
        snippets: state.chat.knowledge().snippets().len(),
        model_configured: state.chat.model().is_configured(),
        voice_configured: state.speech.is_configured(),
    })
}

async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}
