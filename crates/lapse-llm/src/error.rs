use thiserror::Error;

/// Errors that can be returned while asking a model for a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure: connection refused, timeout, TLS, etc.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("invalid model API response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response parsed but carried no text.
    #[error("model returned no text")]
    EmptyResponse,

    /// The prompt was refused by the provider's safety filters.
    #[error("prompt blocked by model: {0}")]
    Blocked(String),

    #[error("no API key configured")]
    MissingApiKey,
}
