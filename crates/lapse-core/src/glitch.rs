//! Word dropout that makes the user's own speech break apart in later stages.
//!
//! Text is split on single spaces and every token is independently replaced
//! by a marker with a stage-dependent probability. Replacement never removes
//! a token, so the token count and all unselected tokens survive unchanged.
//! The random source is supplied by the caller; pass a seeded
//! [`rand::rngs::StdRng`] for reproducible output.

use rand::Rng;

use crate::error::ConfigError;
use crate::stage::Stage;

pub const DEFAULT_MARKER: &str = "...";

/// Replacement probabilities per stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchConfig {
    mild_probability: f64,
    severe_probability: f64,
    marker: String,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            mild_probability: 0.2,
            severe_probability: 0.4,
            marker: DEFAULT_MARKER.to_owned(),
        }
    }
}

impl GlitchConfig {
    /// `mild` applies during stage three, `severe` during stage four.
    pub fn new(mild: f64, severe: f64) -> Result<Self, ConfigError> {
        for p in [mild, severe] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Probability(p));
            }
        }
        Ok(Self {
            mild_probability: mild,
            severe_probability: severe,
            ..Self::default()
        })
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Chance that any single token is dropped during `stage`.
    pub fn probability_for(&self, stage: Stage) -> f64 {
        match stage {
            Stage::One | Stage::Two => 0.0,
            Stage::Three => self.mild_probability,
            Stage::Four => self.severe_probability,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, text: &str, stage: Stage, rng: &mut R) -> String {
        let p = self.probability_for(stage);
        if p == 0.0 {
            return text.to_owned();
        }
        text.split(' ')
            .map(|token| {
                if rng.gen_bool(p) {
                    self.marker.as_str()
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// [`GlitchConfig::apply`] with the default probabilities.
pub fn glitch_text<R: Rng + ?Sized>(text: &str, stage: Stage, rng: &mut R) -> String {
    GlitchConfig::default().apply(text, stage, rng)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
