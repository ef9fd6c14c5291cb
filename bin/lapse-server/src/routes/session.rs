//! Session inspection and teardown.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use lapse_core::SessionStore;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::session::{DeleteSessionResponse, MessageResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_messages, delete_session),
    components(schemas(MessageResponse, DeleteSessionResponse))
)]
pub struct SessionApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions/{id}/messages", get(list_messages))
        .route("/sessions/{id}", delete(delete_session))
}

/// Full conversation history of a session, oldest first.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/messages",
    tag = "sessions",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Conversation history", body = [MessageResponse]),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    let history = state.sessions.history(&id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Forget a session. Deleting an unknown id is not an error.
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Whether a session was removed", body = DeleteSessionResponse),
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<DeleteSessionResponse> {
    let deleted = state.sessions.remove(&id).await;
    info!(session_id = %id, deleted, "session delete requested");
    Json(DeleteSessionResponse { deleted })
}
