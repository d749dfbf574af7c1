//! External generation providers.
//!
//! A provider turns a free-text requirement into an [`ApiDraft`]: the loosely
//! structured answer of a language model. The endpoint source decides which
//! providers to ask and what to do when they fail; providers only report.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::{ProviderKind, ProviderSettings};
use crate::endpoint::{ApiDescriptor, Endpoint, GenerationRequest, RawEndpoint};
use crate::error::{Error, Result};

/// Instructions sent ahead of every requirement
pub const SYSTEM_PROMPT: &str = "You design small REST APIs. Answer with one JSON object and nothing else, shaped as \
{\"name\": string, \"version\": string, \"description\": string, \"endpoints\": [{\"path\": string, \
\"method\": \"GET\" | \"POST\" | \"PUT\" | \"PATCH\" | \"DELETE\", \"summary\": string, \
\"function_name\": snake_case string}]}. Write path parameters as {name}.";

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("code fence pattern is valid"));

/// Something that can turn a requirement into an endpoint list
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs and notes
    fn name(&self) -> &str;

    /// Whether the provider is configured well enough to be asked at all.
    /// Must not perform I/O.
    fn is_available(&self) -> bool;

    /// Ask the provider for an endpoint list.
    ///
    /// Transport failures map to `ExternalCapabilityUnavailable`; an answer
    /// that does not parse maps to `MalformedResponse`.
    async fn generate(&self, requirement: &str) -> Result<ApiDraft>;
}

/// The user message sent for a requirement
pub fn build_prompt(requirement: &str) -> String {
    format!("Design a REST API for this requirement:\n{}", requirement.trim())
}

/// Unvalidated answer of a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDraft {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub endpoints: Vec<RawEndpoint>,
}

#[derive(Deserialize)]
struct DraftDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<JsonValue>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    endpoints: Option<Vec<RawEndpoint>>,
}

impl ApiDraft {
    /// Parse the text a model produced.
    ///
    /// Markdown code fences and any chatter around the JSON value are
    /// ignored. Every `{` or `[` is tried as a start in turn, so bracketed
    /// prose ahead of the answer does not hide it. Both the full object and
    /// a bare endpoint array are accepted.
    pub fn parse(text: &str) -> Result<Self> {
        let body = CODE_FENCE
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(text, |m| m.as_str());

        let mut first_error = None;
        for (start, _) in body.match_indices(['{', '[']) {
            let parsed = serde_json::Deserializer::from_str(&body[start..])
                .into_iter::<JsonValue>()
                .next();
            let attempt = match parsed {
                Some(Ok(value)) => Self::from_value(value),
                Some(Err(e)) => Err(Error::malformed(format!("response is not valid JSON: {}", e))),
                None => continue,
            };
            match attempt {
                Ok(draft) => return Ok(draft),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| Error::malformed("response contains no JSON value")))
    }

    fn from_value(value: JsonValue) -> Result<Self> {
        if value.is_array() {
            let endpoints: Vec<RawEndpoint> = serde_json::from_value(value)
                .map_err(|e| Error::malformed(format!("endpoint list has the wrong shape: {}", e)))?;
            return Ok(Self {
                endpoints,
                ..Self::default()
            });
        }

        let document: DraftDocument = serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("response has the wrong shape: {}", e)))?;
        let endpoints = document
            .endpoints
            .ok_or_else(|| Error::malformed("response has no endpoints list"))?;
        let version = match document.version {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(Error::malformed(format!(
                    "version must be a string, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            name: document.name,
            version,
            description: document.description,
            endpoints,
        })
    }

    /// Validate the draft into a request. Zero endpoints or any illegal
    /// endpoint is a malformed response.
    pub fn into_request(self) -> Result<GenerationRequest> {
        if self.endpoints.is_empty() {
            return Err(Error::malformed("response lists no endpoints"));
        }
        let endpoints = self
            .endpoints
            .iter()
            .map(Endpoint::from_raw)
            .collect::<Result<Vec<_>>>()?;
        let descriptor = ApiDescriptor::with_defaults(
            self.name.as_deref(),
            self.version.as_deref(),
            self.description.as_deref(),
        );
        Ok(GenerationRequest::new(descriptor, endpoints))
    }
}

/// Build providers from settings, keeping their order
pub fn build_providers(settings: &[ProviderSettings]) -> Result<Vec<Box<dyn GenerationProvider>>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("cradle/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

    Ok(settings
        .iter()
        .map(|s| -> Box<dyn GenerationProvider> {
            match s.kind {
                ProviderKind::OpenAi => Box::new(OpenAiProvider::from_settings(client.clone(), s)),
                ProviderKind::Ollama => Box::new(OllamaProvider::from_settings(client.clone(), s)),
            }
        })
        .collect())
}

/// Keep error bodies short in messages
pub(crate) fn excerpt(text: &str) -> String {
    const LIMIT: usize = 200;
    let text = text.trim();
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;

    #[test]
    fn test_parse_full_object() {
        let draft = ApiDraft::parse(
            r#"{"name": "Tasks", "version": 2, "description": "Task tracker",
                "endpoints": [{"path": "/tasks", "method": "get", "summary": "List tasks", "functionName": "list_tasks"}]}"#,
        )
        .unwrap();
        assert_eq!(draft.name.as_deref(), Some("Tasks"));
        assert_eq!(draft.version.as_deref(), Some("2"));
        assert_eq!(draft.endpoints.len(), 1);
        assert_eq!(draft.endpoints[0].function_name.as_deref(), Some("list_tasks"));
    }

    #[test]
    fn test_parse_fenced_bare_array_with_chatter() {
        let text = "Sure! Here it is:\n```json\n[{\"path\": \"/items\", \"method\": \"POST\", \"summary\": \"Create\", \"func_name\": \"create_item\"}]\n```\nEnjoy.";
        let draft = ApiDraft::parse(text).unwrap();
        assert_eq!(draft.name, None);
        assert_eq!(draft.endpoints[0].function_name.as_deref(), Some("create_item"));

        let request = draft.into_request().unwrap();
        assert_eq!(request.descriptor().name, "Custom API");
        assert_eq!(request.endpoints()[0].method(), HttpMethod::Post);
    }

    #[test]
    fn test_parse_skips_bracketed_prose() {
        let text = r#"Here is the API [v1]: {"name": "Books", "endpoints": [{"path": "/books", "method": "GET"}]}"#;
        let draft = ApiDraft::parse(text).unwrap();
        assert_eq!(draft.name.as_deref(), Some("Books"));
        assert_eq!(draft.endpoints.len(), 1);

        let draft = ApiDraft::parse("Note {draft}: [{\"path\": \"/a\", \"method\": \"GET\"}]").unwrap();
        assert_eq!(draft.endpoints[0].path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_hostile_name_yields_local_output_names() {
        let request = ApiDraft::parse(
            r#"{"name": "../../etc/cron.d/pwn", "endpoints": [{"path": "/x", "method": "GET"}]}"#,
        )
        .unwrap()
        .into_request()
        .unwrap();
        let name = &request.descriptor().name;
        assert_eq!(crate::artifacts::project_dir_name(name), "etccrondpwn");
        assert_eq!(
            crate::artifacts::archive_file_name(name),
            "etccrondpwn_cradle.zip"
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = ApiDraft::parse("I cannot help with that.").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        let err = ApiDraft::parse("{\"endpoints\": [").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        let err = ApiDraft::parse("{\"name\": \"x\"}").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_or_illegal_endpoints_are_malformed() {
        let empty = ApiDraft::parse("{\"endpoints\": []}").unwrap();
        assert!(matches!(
            empty.into_request().unwrap_err(),
            Error::MalformedResponse(_)
        ));

        let bad_method = ApiDraft::parse(r#"[{"path": "/x", "method": "TRACE"}]"#).unwrap();
        assert!(matches!(
            bad_method.into_request().unwrap_err(),
            Error::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_build_providers_keeps_order() {
        let providers = build_providers(&[
            ProviderSettings::ollama_from_env(),
            ProviderSettings::openai_from_env(),
        ])
        .unwrap();
        assert_eq!(providers.len(), 2);
        assert!(providers[0].name().starts_with("ollama:"));
        assert!(providers[1].name().starts_with("openai:"));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  short "), "short");
        let long = "x".repeat(300);
        assert_eq!(excerpt(&long).len(), 203);
    }
}
