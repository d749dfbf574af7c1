//! OpenAI-compatible chat completions provider.

use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{build_prompt, excerpt, ApiDraft, GenerationProvider, SYSTEM_PROMPT};
use crate::config::ProviderSettings;
use crate::error::{Error, Result};

pub struct OpenAiProvider {
    client: reqwest::Client,
    name: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let model = model.into();
        Self {
            client,
            name: format!("openai:{}", model),
            base_url: base_url.into(),
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }

    /// Build from settings, reading the key from the configured variable
    pub fn from_settings(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        let api_key = settings
            .api_key_env
            .as_deref()
            .and_then(|var| env::var(var).ok());
        let mut provider = Self::new(client, &settings.base_url, &settings.model, api_key);
        provider.temperature = settings.temperature;
        provider.max_tokens = settings.max_tokens;
        provider
    }

    fn endpoint_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, requirement: &str) -> Result<ApiDraft> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::unavailable(format!("{} has no API key", self.name)))?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(requirement)},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        log::debug!("POST {} ({})", self.endpoint_url(), self.name);
        let response = self
            .client
            .post(self.endpoint_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::unavailable(format!(
                "{} returned HTTP {}: {}",
                self.name,
                status,
                excerpt(&text)
            )));
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::malformed(format!("{} returned no message content", self.name)))?;
        ApiDraft::parse(&content)
    }
}
