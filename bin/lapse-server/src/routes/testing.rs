//! Router-level test helpers: a scripted model and one-shot request plumbing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use lapse_core::PromptLibrary;
use lapse_llm::{LlmError, TextGenerator};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

/// Generator that records every prompt and answers with a fixed reply.
pub struct Scripted {
    reply: Option<String>,
    seen: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn reply(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_owned()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Every call fails with [`LlmError::EmptyResponse`].
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(prompt.to_owned());
        self.reply.clone().ok_or(LlmError::EmptyResponse)
    }
}

pub fn test_state_with(config: Config, generator: Arc<dyn TextGenerator>) -> Arc<AppState> {
    let prompts = PromptLibrary::builtin().unwrap();
    Arc::new(AppState::new(config, prompts, generator))
}

/// Default config with a fixed glitch seed, wired into a full router.
pub fn test_app(generator: Arc<Scripted>) -> (Router, Arc<AppState>, Arc<Scripted>) {
    let config = Config::from_lookup(|key| (key == "LAPSE_GLITCH_SEED").then(|| "7".to_owned()))
        .unwrap();
    let shared: Arc<dyn TextGenerator> = generator.clone();
    let state = test_state_with(config, shared);
    (routes::build(Arc::clone(&state)), state, generator)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}
