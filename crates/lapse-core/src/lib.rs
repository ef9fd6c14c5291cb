//! lapse-core – the conversation rules shared by the server and the CLI.
//!
//! - [`stage`]: elapsed seconds → narrative [`Stage`]
//! - [`glitch`]: stage-dependent word dropout applied to user text
//! - [`prompt`]: stage-keyed prompt templates
//! - [`session`]: per-session conversation history
//! - [`script`]: fixed narrative content (opening line, fallback reply, clock)

pub mod error;
pub mod glitch;
pub mod prompt;
pub mod script;
pub mod session;
pub mod stage;

pub use error::{ConfigError, PromptError, SessionError};
pub use glitch::GlitchConfig;
pub use prompt::{FilledPrompt, PromptLibrary, PromptTemplate, PromptVars};
pub use session::{InMemorySessionStore, Message, Role, Session, SessionStore};
pub use stage::{Stage, StageThresholds};
