use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message, already glitched by the client.
    pub message: String,
    /// Seconds since the experience began.
    pub elapsed_time: u64,
    /// Client-generated session id. A new session is created when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Describes how the reply was produced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LlmMetadata {
    pub model: String,
    /// The unrendered prompt template.
    pub prompt: String,
    pub purpose: String,
    pub stage: u8,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// The partner's reply, verbatim from the model.
    pub response: String,
    pub stage: u8,
    #[serde(rename = "elapsedTime")]
    pub elapsed_time: u64,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub llm_metadata: LlmMetadata,
}
