//! Local Ollama provider.
//!
//! Uses the non-streaming `/api/generate` endpoint with JSON output forced.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{build_prompt, excerpt, ApiDraft, GenerationProvider, SYSTEM_PROMPT};
use crate::config::ProviderSettings;
use crate::error::{Error, Result};

pub struct OllamaProvider {
    client: reqwest::Client,
    name: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            name: format!("ollama:{}", model),
            base_url: base_url.into(),
            model,
            temperature: 0.2,
            max_tokens: 1024,
        }
    }

    pub fn from_settings(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        let mut provider = Self::new(client, &settings.base_url, &settings.model);
        provider.temperature = settings.temperature;
        provider.max_tokens = settings.max_tokens;
        provider
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    // Reachability is only known after a call
    fn is_available(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    async fn generate(&self, requirement: &str) -> Result<ApiDraft> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "system": SYSTEM_PROMPT,
            "prompt": build_prompt(requirement),
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            },
        });

        log::debug!("POST {} ({})", url, self.name);
        let response = self.client.post(&url).json(&body).send().await?;

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

        let generated: GenerateResponse = response.json().await?;
        ApiDraft::parse(&generated.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_reads_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.2", "stream": false, "format": "json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "response": "[{\"path\": \"/books\", \"method\": \"GET\", \"summary\": \"List books\"}]",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(reqwest::Client::new(), server.uri(), "llama3.2");
        assert!(provider.is_available());
        let draft = provider.generate("a library").await.unwrap();
        assert_eq!(draft.endpoints.len(), 1);
        assert_eq!(draft.endpoints[0].path.as_deref(), Some("/books"));
    }

    #[tokio::test]
    async fn test_missing_model_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "model \"nope\" not found"})),
            )
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(reqwest::Client::new(), server.uri(), "nope");
        let err = provider.generate("a library").await.unwrap_err();
        assert!(matches!(err, Error::ExternalCapabilityUnavailable(_)));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(reqwest::Client::new(), server.uri(), "llama3.2");
        let err = provider.generate("a library").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
