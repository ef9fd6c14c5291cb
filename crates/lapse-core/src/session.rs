//! Conversation history per session.
//!
//! [`SessionStore`] defines the interface; the default implementation is the
//! process-local [`InMemorySessionStore`]. Swapping in another backend only
//! requires implementing the trait and changing the concrete type held by the
//! server state.
//!
//! All trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::SessionError;

/// Author of a message. The partner is spelled `"assistant"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Partner,
}

/// A single turn in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Elapsed seconds since the experience began.
    pub timestamp: u64,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: u64) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn partner(content: impl Into<String>, timestamp: u64) -> Self {
        Self {
            role: Role::Partner,
            content: content.into(),
            timestamp,
        }
    }
}

/// Snapshot of one session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub history: Vec<Message>,
    pub started_at: DateTime<Utc>,
    last_active: Instant,
}

impl Session {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            history: Vec::new(),
            started_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    /// Time since the session was last read or written.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

/// Storage for conversation histories.
pub trait SessionStore: Send + Sync + 'static {
    /// Return the session for `id`, creating an empty one if none exists.
    fn get_or_create(&self, id: &str) -> impl Future<Output = Session> + Send;

    /// Append `message` and return the full history including it.
    fn append(
        &self,
        id: &str,
        message: Message,
    ) -> impl Future<Output = Result<Vec<Message>, SessionError>> + Send;

    fn history(&self, id: &str) -> impl Future<Output = Result<Vec<Message>, SessionError>> + Send;

    /// Drop a session. Returns `true` if it existed.
    fn remove(&self, id: &str) -> impl Future<Output = bool> + Send;

    fn len(&self) -> impl Future<Output = usize> + Send;

    /// Remove every session idle for longer than `max_idle`; returns the count.
    fn evict_idle(&self, max_idle: Duration) -> impl Future<Output = usize> + Send;
}

/// Process-local store behind a `tokio::sync::RwLock<HashMap>`.
///
/// Every operation takes the lock once, so individual reads and writes are
/// atomic. A chat turn spans several operations and is not.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Periodically evict sessions idle for longer than `ttl`.
    pub fn spawn_sweeper(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.evict_idle(ttl).await;
            }
        })
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: &str) -> Session {
        let mut map = self.inner.write().await;
        let session = map.entry(id.to_owned()).or_insert_with(|| {
            debug!(session_id = %id, "creating session");
            Session::new(id)
        });
        session.last_active = Instant::now();
        session.clone()
    }

    async fn append(&self, id: &str, message: Message) -> Result<Vec<Message>, SessionError> {
        let mut map = self.inner.write().await;
        let session = map
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_owned()))?;
        if let Some(last) = session.history.last() {
            if message.timestamp < last.timestamp {
                warn!(
                    session_id = %id,
                    previous = last.timestamp,
                    current = message.timestamp,
                    "message timestamp went backwards"
                );
            }
        }
        session.history.push(message);
        session.last_active = Instant::now();
        Ok(session.history.clone())
    }

    async fn history(&self, id: &str) -> Result<Vec<Message>, SessionError> {
        self.inner
            .read()
            .await
            .get(id)
            .map(|s| s.history.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_owned()))
    }

    async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, s| s.idle_for() <= max_idle);
        let evicted = before - map.len();
        if evicted > 0 {
            info!(evicted, remaining = map.len(), "evicted idle sessions");
        }
        evicted
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
