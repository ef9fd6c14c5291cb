//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Each variant carries its error kind and
//! is mapped to a status code here and nowhere else. The body is
//! `{"error": <summary>, "details": <underlying message>}`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lapse_core::{PromptError, SessionError};
use lapse_llm::LlmError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// All errors that can occur in the lapse-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent a body or query string that could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Template lookup or rendering failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// The hosted model could not produce a reply.
    #[error(transparent)]
    Generation(#[from] LlmError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ServerError {
    fn from(e: JsonRejection) -> Self {
        ServerError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(e: QueryRejection) -> Self {
        ServerError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let details = self.to_string();
        let (status, summary) = match &self {
            ServerError::BadRequest(_) => {
                warn!(error = %details, "rejected malformed request");
                (StatusCode::BAD_REQUEST, "Invalid request")
            }
            ServerError::Session(SessionError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Session not found")
            }
            ServerError::Prompt(e) => {
                error!(error = %e, "prompt resolution failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process chat message")
            }
            ServerError::Generation(e) => {
                error!(error = %e, "model call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process chat message")
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(json!({ "error": summary, "details": details }))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ServerError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn model_failure_is_500_with_details() {
        let (status, body) = render(ServerError::Generation(LlmError::Status {
            status: 429,
            body: "quota".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process chat message");
        assert_eq!(body["details"], "model API returned 429: quota");
    }

    #[tokio::test]
    async fn missing_session_is_404() {
        let (status, body) = render(SessionError::NotFound("s9".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["details"], "session not found: s9");
    }

    #[tokio::test]
    async fn bad_request_is_400() {
        let (status, body) = render(ServerError::BadRequest("missing field".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn prompt_failure_is_500() {
        let (status, _) =
            render(PromptError::UnknownTemplate("stage_7_response".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
