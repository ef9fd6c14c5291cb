//! Shared application state injected into every Axum handler.

use std::sync::{Arc, Mutex};

use lapse_core::{InMemorySessionStore, PromptLibrary, Stage};
use lapse_llm::TextGenerator;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::Config;
use crate::error::ServerError;

/// State shared across all HTTP handlers.
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversation histories keyed by session id.
    pub sessions: InMemorySessionStore,
    pub prompts: Arc<PromptLibrary>,
    /// Model used to produce partner replies.
    pub generator: Arc<dyn TextGenerator>,
    glitch_rng: Mutex<StdRng>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("model", &self.generator.model())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config, prompts: PromptLibrary, generator: Arc<dyn TextGenerator>) -> Self {
        let rng = match config.glitch_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: Arc::new(config),
            sessions: InMemorySessionStore::new(),
            prompts: Arc::new(prompts),
            generator,
            glitch_rng: Mutex::new(rng),
        }
    }

    pub fn stage_for(&self, elapsed_secs: u64) -> Stage {
        self.config.stage_thresholds.stage_for(elapsed_secs)
    }

    /// Apply the configured glitch transform using the shared RNG.
    pub fn glitch(&self, text: &str, stage: Stage) -> Result<String, ServerError> {
        let mut rng = self
            .glitch_rng
            .lock()
            .map_err(|_| ServerError::Internal("glitch RNG lock poisoned".into()))?;
        Ok(self.config.glitch.apply(text, stage, &mut *rng))
    }
}
