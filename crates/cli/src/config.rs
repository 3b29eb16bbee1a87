//! Configuration loading from deckhand.toml and the environment.

use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "deckhand.toml";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_MODEL: &str = "OPENAI_MODEL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model endpoint configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Replaces the built-in system prompt.
    pub system_prompt: Option<String>,

    /// Model round trips allowed per user turn.
    pub max_iterations: Option<usize>,
}

/// Model endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `http://localhost:8000/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer credential. Optional for local endpoints.
    pub api_key: Option<String>,

    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` if given, else `deckhand.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Apply `OPENAI_BASE_URL`, `OPENAI_API_KEY` and `OPENAI_MODEL`
    /// overrides; empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v: &String| !v.is_empty());
        if let Some(base_url) = var(ENV_BASE_URL) {
            self.backend.base_url = base_url;
        }
        if let Some(api_key) = var(ENV_API_KEY) {
            self.backend.api_key = Some(api_key);
        }
        if let Some(model) = var(ENV_MODEL) {
            self.backend.model = model;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
