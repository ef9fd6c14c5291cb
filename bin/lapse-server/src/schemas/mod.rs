//! Request / response bodies for the HTTP API.
//!
//! Field names follow the browser client, which sends and expects camelCase
//! (`elapsedTime`, `sessionId`), except `llm_metadata`.

pub mod chat;
pub mod session;
pub mod stage;
