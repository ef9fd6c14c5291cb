use thiserror::Error;

/// Errors raised while loading or rendering prompt templates.
#[derive(Debug, Error)]
pub enum PromptError {
    /// No template is registered under the requested key.
    #[error("unknown prompt template: {0}")]
    UnknownTemplate(String),

    /// A loaded library lacks the template for one of the four stages.
    #[error("prompt library is missing required template `{0}`")]
    MissingStage(String),

    /// The template source could not be parsed or rendered.
    #[error("template `{name}` failed: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The TOML document holding the templates is malformed.
    #[error("invalid prompt library: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read prompt library: {0}")]
    Io(#[from] std::io::Error),

    /// Conversation history could not be serialized into the prompt.
    #[error("failed to serialize conversation history: {0}")]
    History(#[from] serde_json::Error),
}

/// Errors returned by a [`crate::session::SessionStore`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
}

/// Invalid stage or glitch tuning values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("stage thresholds must be strictly ascending, got {0}, {1}, {2}")]
    ThresholdOrder(u64, u64, u64),

    #[error("stage thresholds must be three comma-separated integers: {0}")]
    ThresholdFormat(String),

    #[error("glitch probability {0} is outside [0, 1]")]
    Probability(f64),
}
