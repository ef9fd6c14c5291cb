//! lapse-llm – text generation against a hosted model.
//!
//! Callers depend on the [`TextGenerator`] trait; [`GeminiClient`] is the
//! production implementation.
//!
//! # Example
//! ```rust,no_run
//! # async fn demo() -> Result<(), lapse_llm::LlmError> {
//! use lapse_llm::{GeminiClient, TextGenerator};
//! let client = GeminiClient::builder("my-key")
//!     .model("gemini-2.5-flash")
//!     .build()?;
//! let reply = client.generate("Say hello").await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod gemini;

pub use error::LlmError;
pub use gemini::{GeminiClient, GeminiClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;

/// A model that turns a prompt into a single text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Identifier of the underlying model, reported back to clients.
    fn model(&self) -> &str;

    /// Return the first completion verbatim. No retries are attempted.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
