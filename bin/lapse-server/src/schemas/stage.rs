use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct StageQuery {
    pub elapsed_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse {
    pub stage: u8,
    pub name: String,
    pub elapsed_time: u64,
    /// Chance that any word the user types is lost during this stage.
    pub glitch_probability: f64,
}

/// Request body for `POST /api/glitch`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlitchRequest {
    pub text: String,
    pub elapsed_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GlitchResponse {
    pub text: String,
    pub stage: u8,
}
