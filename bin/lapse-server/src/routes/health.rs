//! Liveness probe.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use lapse_core::SessionStore;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthResponse)))]
pub struct HealthApi;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Model that answers chat turns.
    pub model: String,
    /// Sessions currently held in memory.
    pub sessions: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        model: state.generator.model().to_owned(),
        sessions: state.sessions.len().await,
    })
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::{Scripted, get, post_json, test_app};

    #[tokio::test]
    async fn health_reports_model_and_session_count() {
        let (app, _, _) = test_app(Scripted::reply("hi"));

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["model"], "scripted-model");
        assert_eq!(body["sessions"], 0);

        post_json(
            &app,
            "/api/chat",
            json!({ "message": "Hi", "elapsedTime": 3, "sessionId": "a" }),
        )
        .await;
        let (_, body) = get(&app, "/health").await;
        assert_eq!(body["sessions"], 1);
    }
}
