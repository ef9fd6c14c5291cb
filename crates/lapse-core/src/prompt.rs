//! Stage-keyed prompt templates.
//!
//! A library is a TOML document whose tables are template keys:
//!
//! ```toml
//! [stage_1_response]
//! purpose  = "..."
//! template = "... {{ conversation_history }} ... {{ user_message }} ..."
//! ```
//!
//! Loading fails unless every `stage_{1..4}_response` key is present and
//! parses, so lookups by [`Stage`] cannot miss at request time.

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::PromptError;
use crate::session::Message;
use crate::stage::Stage;

const BUILTIN_LIBRARY: &str = include_str!("prompts/default.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Short description of what the template is meant to achieve.
    pub purpose: String,
    pub template: String,
}

/// Values substituted into a template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptVars<'a> {
    /// JSON-serialized conversation history.
    pub conversation_history: &'a str,
    pub user_message: &'a str,
}

/// A rendered prompt plus the template it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledPrompt {
    pub prompt: String,
    /// The raw, unrendered template.
    pub template_prompt: String,
    pub purpose: String,
}

#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: BTreeMap<String, PromptTemplate>,
    env: Environment<'static>,
}

impl PromptLibrary {
    /// The library compiled into the binary.
    pub fn builtin() -> Result<Self, PromptError> {
        Self::from_toml_str(BUILTIN_LIBRARY)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PromptError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, PromptError> {
        let templates: BTreeMap<String, PromptTemplate> = toml::from_str(raw)?;
        Self::new(templates)
    }

    pub fn new(templates: BTreeMap<String, PromptTemplate>) -> Result<Self, PromptError> {
        for stage in Stage::iter() {
            let key = stage.prompt_key();
            if !templates.contains_key(&key) {
                return Err(PromptError::MissingStage(key));
            }
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for (name, t) in &templates {
            env.add_template_owned(name.clone(), t.template.clone())
                .map_err(|source| PromptError::Render {
                    name: name.clone(),
                    source,
                })?;
        }

        Ok(Self { templates, env })
    }

    pub fn get(&self, key: &str) -> Option<&PromptTemplate> {
        self.templates.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Render the template registered under `key`.
    pub fn fill(&self, key: &str, vars: &PromptVars<'_>) -> Result<FilledPrompt, PromptError> {
        let t = self
            .templates
            .get(key)
            .ok_or_else(|| PromptError::UnknownTemplate(key.to_owned()))?;
        let prompt = self
            .env
            .get_template(key)
            .and_then(|tmpl| tmpl.render(vars))
            .map_err(|source| PromptError::Render {
                name: key.to_owned(),
                source,
            })?;
        Ok(FilledPrompt {
            prompt,
            template_prompt: t.template.clone(),
            purpose: t.purpose.clone(),
        })
    }

    /// Render the template for `stage` over `history` serialized as JSON.
    pub fn resolve(
        &self,
        stage: Stage,
        history: &[Message],
        user_message: &str,
    ) -> Result<FilledPrompt, PromptError> {
        let conversation_history = serde_json::to_string(history)?;
        self.fill(
            &stage.prompt_key(),
            &PromptVars {
                conversation_history: &conversation_history,
                user_message,
            },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
