//! Stage lookups and server-side helpers for thin clients.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use lapse_core::script::OPENING_LINE;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::session::MessageResponse;
use crate::schemas::stage::{GlitchRequest, GlitchResponse, StageQuery, StageResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_stage, glitch, opening),
    components(schemas(StageResponse, GlitchRequest, GlitchResponse))
)]
pub struct StageApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stage", get(get_stage))
        .route("/glitch", post(glitch))
        .route("/opening", get(opening))
}

/// Which stage a given elapsed time falls in.
#[utoipa::path(
    get,
    path = "/api/stage",
    tag = "stage",
    params(StageQuery),
    responses(
        (status = 200, description = "Stage for the elapsed time", body = StageResponse),
        (status = 400, description = "Missing or invalid elapsedTime"),
    )
)]
pub async fn get_stage(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StageQuery>, QueryRejection>,
) -> Result<Json<StageResponse>, ServerError> {
    let Query(q) = query?;
    let stage = state.stage_for(q.elapsed_time);
    Ok(Json(StageResponse {
        stage: stage.number(),
        name: stage.name().to_owned(),
        elapsed_time: q.elapsed_time,
        glitch_probability: state.config.glitch.probability_for(stage),
    }))
}

/// Apply the word-dropout transform for the stage at `elapsedTime`.
#[utoipa::path(
    post,
    path = "/api/glitch",
    tag = "stage",
    request_body = GlitchRequest,
    responses(
        (status = 200, description = "Transformed text", body = GlitchResponse),
        (status = 400, description = "Malformed request body"),
    )
)]
pub async fn glitch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GlitchRequest>, JsonRejection>,
) -> Result<Json<GlitchResponse>, ServerError> {
    let Json(req) = payload?;
    let stage = state.stage_for(req.elapsed_time);
    let text = state.glitch(&req.text, stage)?;
    Ok(Json(GlitchResponse {
        text,
        stage: stage.number(),
    }))
}

/// The partner's first line, shown before the user types anything.
#[utoipa::path(
    get,
    path = "/api/opening",
    tag = "stage",
    responses((status = 200, description = "Opening message", body = MessageResponse))
)]
pub async fn opening() -> Json<MessageResponse> {
    Json(MessageResponse {
        role: "assistant".to_owned(),
        content: OPENING_LINE.to_owned(),
        timestamp: 0,
    })
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::config::Config;
    use crate::routes;
    use crate::routes::testing::{Scripted, get, post_json, test_app, test_state_with};

    #[tokio::test]
    async fn stage_lookup_reports_name_and_probability() {
        let (app, _, _) = test_app(Scripted::reply("unused"));

        let (status, body) = get(&app, "/api/stage?elapsedTime=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "stage": 1,
                "name": "The Celebration - 40th Anniversary",
                "elapsedTime": 30,
                "glitchProbability": 0.0,
            })
        );

        let (_, body) = get(&app, "/api/stage?elapsedTime=150").await;
        assert_eq!(body["stage"], 3);
        assert_eq!(body["glitchProbability"], 0.2);

        let (_, body) = get(&app, "/api/stage?elapsedTime=9999").await;
        assert_eq!(body["stage"], 4);
        assert_eq!(body["glitchProbability"], 0.4);
    }

    #[tokio::test]
    async fn stage_lookup_requires_elapsed_time() {
        let (app, _, _) = test_app(Scripted::reply("unused"));
        let (status, body) = get(&app, "/api/stage").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");

        let (status, _) = get(&app, "/api/stage?elapsedTime=soon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn configured_thresholds_are_used() {
        let config = Config::from_lookup(|key| {
            (key == "LAPSE_STAGE_THRESHOLDS").then(|| "10,20,30".to_owned())
        })
        .unwrap();
        let app = routes::build(test_state_with(config, Scripted::reply("unused")));
        let (_, body) = get(&app, "/api/stage?elapsedTime=25").await;
        assert_eq!(body["stage"], 3);
    }

    #[tokio::test]
    async fn glitch_leaves_early_text_alone() {
        let (app, _, _) = test_app(Scripted::reply("unused"));
        let text = "I remember the lake house very well";
        let (status, body) = post_json(
            &app,
            "/api/glitch",
            json!({ "text": text, "elapsedTime": 90 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": text, "stage": 2 }));
    }

    #[tokio::test]
    async fn glitch_late_text_keeps_token_count() {
        let (app, _, _) = test_app(Scripted::reply("unused"));
        let text = "one two three four five six seven eight nine ten";
        let (_, body) = post_json(
            &app,
            "/api/glitch",
            json!({ "text": text, "elapsedTime": 200 }),
        )
        .await;
        assert_eq!(body["stage"], 4);
        let out = body["text"].as_str().unwrap();
        let out_tokens: Vec<&str> = out.split(' ').collect();
        assert_eq!(out_tokens.len(), 10);
        for (got, orig) in out_tokens.iter().zip(text.split(' ')) {
            assert!(*got == orig || *got == "...");
        }
    }

    #[tokio::test]
    async fn opening_line_is_at_time_zero() {
        let (app, _, _) = test_app(Scripted::reply("unused"));
        let (status, body) = get(&app, "/api/opening").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "assistant");
        assert_eq!(body["timestamp"], 0);
        assert!(body["content"].as_str().unwrap().starts_with("Happy Anniversary"));
    }
}
