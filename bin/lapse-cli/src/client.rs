//! Thin HTTP client for `lapse-server`.

use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    elapsed_time: u64,
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GlitchRequest<'a> {
    text: &'a str,
    elapsed_time: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Text after the server's word dropout, and the stage it used.
#[derive(Debug, Deserialize)]
pub struct GlitchReply {
    pub text: String,
    pub stage: u8,
}

#[derive(Debug, Deserialize)]
pub struct StageReply {
    pub stage: u8,
}

pub struct ChatClient {
    http: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(server: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("lapse-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_http(http, server))
    }

    pub(crate) fn with_http(http: Client, server: &str) -> Self {
        Self {
            http,
            base_url: server.trim_end_matches('/').to_owned(),
        }
    }

    /// Send one message and return the partner's reply.
    pub async fn send(
        &self,
        session_id: &str,
        message: &str,
        elapsed_time: u64,
    ) -> anyhow::Result<ChatReply> {
        debug!(session_id, elapsed_time, len = message.len(), "POST /api/chat");
        let resp = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                message,
                elapsed_time,
                session_id,
            })
            .send()
            .await
            .context("server unreachable")?;
        decode(resp).await
    }

    /// Glitch `text` with the server's stage thresholds and probabilities.
    pub async fn glitch(&self, text: &str, elapsed_time: u64) -> anyhow::Result<GlitchReply> {
        let resp = self
            .http
            .post(format!("{}/api/glitch", self.base_url))
            .json(&GlitchRequest { text, elapsed_time })
            .send()
            .await
            .context("server unreachable")?;
        decode(resp).await
    }

    /// The server's stage for `elapsed_time`.
    pub async fn stage(&self, elapsed_time: u64) -> anyhow::Result<StageReply> {
        let resp = self
            .http
            .get(format!("{}/api/stage?elapsedTime={elapsed_time}", self.base_url))
            .send()
            .await
            .context("server unreachable")?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("server returned {status}: {body}");
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
