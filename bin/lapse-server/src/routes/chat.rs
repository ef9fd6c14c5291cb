//! The conversation turn.
//!
//! One request is one sequential round trip: pick the stage from the elapsed
//! time, record the user's message, render the stage prompt over the whole
//! history (including that message), ask the model, record its reply.
//! The message is used exactly as sent; any glitching already happened on the
//! client.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use lapse_core::{Message, SessionStore};
use tracing::{debug, info};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, ChatResponse, LlmMetadata};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ChatResponse, LlmMetadata))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Send one message to the partner (`POST /api/chat`).
///
/// When `sessionId` is missing a new session is created and its id returned.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Partner replied", body = ChatResponse),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Prompt or model failure"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = payload?;
    let stage = state.stage_for(req.elapsed_time);
    let session_id = req
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_session_id);

    state.sessions.get_or_create(&session_id).await;
    let history = state
        .sessions
        .append(&session_id, Message::user(&req.message, req.elapsed_time))
        .await?;

    let filled = state.prompts.resolve(stage, &history, &req.message)?;
    debug!(
        session_id = %session_id,
        stage = stage.number(),
        history_len = history.len(),
        prompt_len = filled.prompt.len(),
        "prompt resolved"
    );

    let reply = state.generator.generate(&filled.prompt).await?;

    // The session may have been deleted or evicted while the model was busy.
    state
        .sessions
        .append(&session_id, Message::partner(&reply, req.elapsed_time))
        .await
        .map_err(|e| ServerError::Internal(format!("reply not recorded: {e}")))?;

    info!(
        session_id = %session_id,
        stage = stage.number(),
        elapsed = req.elapsed_time,
        reply_len = reply.len(),
        "chat turn done"
    );

    Ok(Json(ChatResponse {
        response: reply,
        stage: stage.number(),
        elapsed_time: req.elapsed_time,
        session_id,
        llm_metadata: LlmMetadata {
            model: state.generator.model().to_owned(),
            prompt: filled.template_prompt,
            purpose: filled.purpose,
            stage: stage.number(),
        },
    }))
}

fn new_session_id() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
