//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use lapse_core::{GlitchConfig, StageThresholds};

/// Runtime configuration for lapse-server.
///
/// Every field except the API key has a default so the server starts without
/// any environment set.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_openapi: bool,

    pub gemini_api_key: String,
    pub model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,

    /// Prompt library override; the compiled-in library is used when unset.
    pub prompts_path: Option<PathBuf>,

    pub stage_thresholds: StageThresholds,
    pub glitch: GlitchConfig,
    /// Fixed seed for the server-side glitch RNG. Unset means OS entropy.
    pub glitch_seed: Option<u64>,

    /// Idle time after which a session is evicted; zero disables eviction.
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("stage_thresholds", &self.stage_thresholds)
            .field("glitch", &self.glitch)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let stage_thresholds = match lookup("LAPSE_STAGE_THRESHOLDS") {
            Some(raw) => raw.parse::<StageThresholds>().context("LAPSE_STAGE_THRESHOLDS")?,
            None => StageThresholds::default(),
        };

        let glitch = GlitchConfig::new(
            parse_or(&lookup, "LAPSE_GLITCH_MILD", 0.2),
            parse_or(&lookup, "LAPSE_GLITCH_SEVERE", 0.4),
        )
        .context("LAPSE_GLITCH_MILD / LAPSE_GLITCH_SEVERE")?;

        Ok(Self {
            bind_address: env_or("LAPSE_BIND", "0.0.0.0:3000"),
            log_level: env_or("LAPSE_LOG", "info"),
            log_json: flag("LAPSE_LOG_JSON", false),
            cors_allowed_origins: lookup("LAPSE_CORS_ORIGINS").filter(|s| !s.trim().is_empty()),
            enable_openapi: flag("LAPSE_ENABLE_OPENAPI", true),
            gemini_api_key: env_or("GEMINI_API_KEY", ""),
            model: env_or("LAPSE_MODEL", lapse_llm::DEFAULT_MODEL),
            gemini_base_url: env_or("LAPSE_GEMINI_BASE_URL", lapse_llm::DEFAULT_BASE_URL),
            request_timeout: Duration::from_secs(parse_or(&lookup, "LAPSE_REQUEST_TIMEOUT_SECS", 60)),
            prompts_path: lookup("LAPSE_PROMPTS_PATH").map(PathBuf::from),
            stage_thresholds,
            glitch,
            glitch_seed: lookup("LAPSE_GLITCH_SEED").and_then(|v| v.parse().ok()),
            session_ttl: Duration::from_secs(parse_or(&lookup, "LAPSE_SESSION_TTL_SECS", 1800)),
            sweep_interval: Duration::from_secs(
                parse_or(&lookup, "LAPSE_SWEEP_INTERVAL_SECS", 60).max(1),
            ),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
