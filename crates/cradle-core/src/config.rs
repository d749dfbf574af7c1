//! Configuration management for Cradle generation.
//!
//! This module defines the `Config` struct that selects the failure policy,
//! the template kinds, the custom template root and the ordered list of
//! generation providers. The configuration can be loaded from a YAML file,
//! created programmatically, or adjusted from environment variables.
//!
//! Credentials are never stored in the file. Each provider names the
//! environment variable that carries its key.
//!
//! # Examples
//!
//! ```no_run
//! use cradle_core::config::Config;
//! use cradle_core::source::SourceMode;
//!
//! # async fn run() -> cradle_core::Result<()> {
//! let mut config = Config::from_file("cradle.yaml").await?;
//! config.apply_env_overrides();
//! config.mode = SourceMode::Strict;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::source::SourceMode;
use crate::templates::{TemplateKind, TemplateRole};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Default base URL written into client demos
pub const DEFAULT_CLIENT_BASE_URL: &str = "http://localhost:8000";

/// Default overall timeout for one provider call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Backend protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions API
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Settings of one generation provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,

    /// Base URL of the provider API
    pub base_url: String,

    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderSettings {
    /// OpenAI-compatible provider, honoring `CRADLE_OPENAI_BASE_URL` and
    /// `CRADLE_OPENAI_MODEL`
    pub fn openai_from_env() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: env_or("CRADLE_OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            model: env_or("CRADLE_OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            api_key_env: Some(DEFAULT_OPENAI_KEY_ENV.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Local Ollama provider, honoring `CRADLE_OLLAMA_MODEL`
    pub fn ollama_from_env() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: env_or("CRADLE_OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            api_key_env: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// A short label used in logs and notes
    pub fn label(&self) -> String {
        match self.kind {
            ProviderKind::OpenAi => format!("openai:{}", self.model),
            ProviderKind::Ollama => format!("ollama:{}", self.model),
        }
    }
}

/// Configuration for Cradle generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// What to do when no provider produces a usable endpoint list
    #[serde(default)]
    pub mode: SourceMode,

    /// Template used for the server scaffold
    #[serde(default = "TemplateKind::default_server")]
    pub server_template: TemplateKind,

    /// Template used for the client demo
    #[serde(default = "TemplateKind::default_client")]
    pub client_template: TemplateKind,

    /// Optional root directory overriding built-in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,

    /// Base URL the client demo calls
    #[serde(default = "default_client_base_url")]
    pub client_base_url: String,

    /// Overall timeout for one provider call
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Providers in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            server_template: TemplateKind::default_server(),
            client_template: TemplateKind::default_client(),
            template_dir: None,
            client_base_url: default_client_base_url(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            providers: default_providers(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).await?;
        Ok(())
    }

    /// Apply `CRADLE_MODE`, `CRADLE_TIMEOUT_SECS` and `CRADLE_TEMPLATE_DIR`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    /// with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = lookup("CRADLE_MODE") {
            match mode.parse() {
                Ok(mode) => self.mode = mode,
                Err(e) => log::warn!("Ignoring CRADLE_MODE: {}", e),
            }
        }
        if let Some(secs) = lookup("CRADLE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => log::warn!("Ignoring CRADLE_TIMEOUT_SECS={}", secs),
            }
        }
        if let Some(dir) = lookup("CRADLE_TEMPLATE_DIR") {
            self.template_dir = Some(PathBuf::from(dir));
        }
    }

    /// Timeout for one provider call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.server_template.role() != TemplateRole::Server {
            return Err(Error::config(format!(
                "{} is not a server template",
                self.server_template
            )));
        }
        if self.client_template.role() != TemplateRole::Client {
            return Err(Error::config(format!(
                "{} is not a client template",
                self.client_template
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be positive"));
        }
        Url::parse(&self.client_base_url).map_err(|e| {
            Error::config(format!(
                "Invalid client_base_url {}: {}",
                self.client_base_url, e
            ))
        })?;
        for provider in &self.providers {
            Url::parse(&provider.base_url).map_err(|e| {
                Error::config(format!(
                    "Invalid base_url for provider {}: {}",
                    provider.label(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn default_client_base_url() -> String {
    DEFAULT_CLIENT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_providers() -> Vec<ProviderSettings> {
    vec![
        ProviderSettings::openai_from_env(),
        ProviderSettings::ollama_from_env(),
    ]
}
