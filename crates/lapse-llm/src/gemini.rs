//! Google Generative Language API (`generateContent`) client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{LlmError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Builder for [`GeminiClient`].
pub struct GeminiClientBuilder {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
    use_env_proxy: bool,
}

impl GeminiClientBuilder {
    /// Model name, e.g. `"gemini-2.5-flash"` (default: [`DEFAULT_MODEL`]).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// API root without the `/v1beta` suffix (default: [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Whole-request timeout. Without one, the request may wait indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignore `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub fn no_proxy(mut self) -> Self {
        self.use_env_proxy = false;
        self
    }

    pub fn build(self) -> Result<GeminiClient, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let mut builder =
            Client::builder().user_agent(concat!("lapse-llm/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        if !self.use_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(GeminiClient {
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            client: builder.build()?,
        })
    }
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn builder(api_key: impl Into<String>) -> GeminiClientBuilder {
        GeminiClientBuilder {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            use_env_proxy: true,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "generateContent");

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model API returned an error status");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        parsed.into_text()
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [TextPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, LlmError> {
        let Some(first) = self.candidates.into_iter().next() else {
            return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => LlmError::Blocked(reason),
                None => LlmError::EmptyResponse,
            });
        };

        let text: String = first
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            Err(LlmError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::builder("test-key")
            .model("gemini-test")
            .base_url(base_url)
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_returns_first_candidate() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(
                |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert_eq!(call, "gemini-test:generateContent");
                    assert_eq!(headers["x-goog-api-key"], "test-key");
                    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
                    Json(json!({
                        "candidates": [
                            { "content": { "role": "model", "parts": [
                                { "text": "echo: " }, { "text": prompt }
                            ] } },
                            { "content": { "parts": [{ "text": "ignored" }] } }
                        ]
                    }))
                },
            ),
        );
        let base = serve(router).await;

        let reply = client(&base).generate("hello *smiles*").await.unwrap();
        assert_eq!(reply, "echo: hello *smiles*");
    }

    #[tokio::test]
    async fn error_status_is_surfaced_with_body() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exhausted") }),
        );
        let base = serve(router).await;

        match client(&base).generate("hi").await {
            Err(LlmError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let router = Router::new().route("/v1beta/models/{call}", post(|| async { "not json" }));
        let base = serve(router).await;
        assert!(matches!(
            client(&base).generate("hi").await,
            Err(LlmError::Json(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(matches!(
            client(&format!("http://{addr}")).generate("hi").await,
            Err(LlmError::Http(_))
        ));
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(matches!(resp.into_text(), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn candidate_without_text_is_empty() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }))
                .unwrap();
        assert!(matches!(resp.into_text(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            GeminiClient::builder("  ").build(),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = client("http://localhost:9/");
        assert_eq!(
            c.endpoint(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }
}
