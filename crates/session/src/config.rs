use crate::error::{Result, SessionError};
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use sidechat_context_window::FinderConfig;
use std::path::Path;

/// Session-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Word budget for the surrounding-context window
    pub context_word_budget: usize,

    /// Ancestor levels the context search may climb
    pub max_climb_depth: usize,

    /// Paint the focused panel's context leaves
    pub show_context_highlights: bool,

    /// Model identifier passed through to the transport
    pub model: String,

    /// Token limit for one assistant reply
    pub max_response_tokens: usize,

    /// System context template; `{selection}` and `{context}` are substituted
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context_word_budget: 400,
            max_climb_depth: 3,
            show_context_highlights: true,
            model: "gpt-4o-mini".to_string(),
            max_response_tokens: 1024,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl SessionConfig {
    /// Small windows, no context painting (quick lookups on dense pages)
    pub fn minimal() -> Self {
        Self {
            context_word_budget: 120,
            max_climb_depth: 1,
            show_context_highlights: false,
            ..Default::default()
        }
    }

    /// Wide windows for long-form reading
    pub fn for_long_form() -> Self {
        Self {
            context_word_budget: 1500,
            max_climb_depth: 5,
            max_response_tokens: 2048,
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply `SIDECHAT_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = toml::from_str(&raw)?;
        config.apply_env();
        config.validate()?;
        log::debug!("Loaded session config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; unparsable values are ignored with a warning
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = read("SIDECHAT_CONTEXT_BUDGET") {
            match raw.parse::<usize>() {
                Ok(v) => self.context_word_budget = v,
                Err(_) => log::warn!("Ignoring SIDECHAT_CONTEXT_BUDGET={raw}: not a number"),
            }
        }
        if let Some(raw) = read("SIDECHAT_CLIMB_DEPTH") {
            match raw.parse::<usize>() {
                Ok(v) => self.max_climb_depth = v,
                Err(_) => log::warn!("Ignoring SIDECHAT_CLIMB_DEPTH={raw}: not a number"),
            }
        }
        if let Some(raw) = read("SIDECHAT_SHOW_CONTEXT") {
            match parse_flag(&raw) {
                Some(v) => self.show_context_highlights = v,
                None => log::warn!("Ignoring SIDECHAT_SHOW_CONTEXT={raw}: not a boolean"),
            }
        }
        if let Some(model) = read("SIDECHAT_MODEL") {
            self.model = model;
        }
    }

    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig {
            word_budget: self.context_word_budget,
            max_climb_depth: self.max_climb_depth,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.finder_config()
            .validate()
            .map_err(SessionError::invalid_config)?;

        if self.model.trim().is_empty() {
            return Err(SessionError::invalid_config("model must not be empty"));
        }

        if self.max_response_tokens == 0 {
            return Err(SessionError::invalid_config(
                "max_response_tokens must be > 0",
            ));
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
