//! Generation sessions.
//!
//! A [`Session`] holds what one user has selected and the last thing it
//! generated. Generation takes `&mut self`, so a session never runs two
//! generations at once.

use chrono::Utc;
use serde::Serialize;

use crate::artifacts::ArtifactSet;
use crate::config::Config;
use crate::endpoint::{ApiDescriptor, Endpoint};
use crate::error::{Error, Result};
use crate::render::{RenderSettings, Renderer};
use crate::source::{EndpointSource, SourceOrigin, SourceOutput};
use crate::templates::TemplateManager;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A key of the built-in demo catalog
    Demo(String),
    /// A free-text requirement
    Custom(String),
}

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingChoice,
    AwaitingGeneration,
    Rendered,
}

/// Canned preview of calling an endpoint. Nothing is actually invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedResponse {
    pub message: String,
    pub summary: String,
    pub status: String,
}

impl SimulatedResponse {
    pub fn for_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            message: format!("Called {} {}", endpoint.method(), endpoint.path()),
            summary: endpoint.summary().to_string(),
            status: "ok".to_string(),
        }
    }
}

/// Everything one generation produced
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub descriptor: ApiDescriptor,
    pub endpoints: Vec<Endpoint>,
    pub artifacts: ArtifactSet,
    pub simulated_responses: Vec<SimulatedResponse>,
    pub notes: Vec<String>,
    pub origin: SourceOrigin,
}

pub struct Session {
    source: EndpointSource,
    renderer: Renderer,
    settings: RenderSettings,
    phase: Phase,
    selection: Option<Selection>,
    outcome: Option<GenerationOutcome>,
}

impl Session {
    pub fn new(source: EndpointSource, renderer: Renderer, settings: RenderSettings) -> Self {
        Self {
            source,
            renderer,
            settings,
            phase: Phase::AwaitingChoice,
            selection: None,
            outcome: None,
        }
    }

    /// Build providers and templates as the configuration says
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let source = EndpointSource::from_config(config)?;
        let templates = TemplateManager::new(
            &[config.server_template, config.client_template],
            config.template_dir.clone(),
        )
        .await?;
        Ok(Self::new(
            source,
            Renderer::new(templates),
            RenderSettings::from(config),
        ))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The last successful generation, if the selection has not changed since
    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    /// Forget the selection and any cached outcome
    pub fn reset(&mut self) {
        self.phase = Phase::AwaitingChoice;
        self.selection = None;
        self.outcome = None;
    }

    /// Change the selection. The cached outcome is dropped.
    pub fn select(&mut self, selection: Selection) {
        self.reset();
        self.selection = Some(selection);
        self.phase = Phase::AwaitingGeneration;
    }

    /// Generate artifacts for the current selection.
    ///
    /// On failure the session stays in `AwaitingGeneration` with nothing
    /// cached, so no partial artifacts are ever offered.
    pub async fn generate(&mut self) -> Result<&GenerationOutcome> {
        self.outcome = None;
        let selection = match &self.selection {
            Some(selection) => selection.clone(),
            None => {
                return Err(Error::invalid_input(
                    "Choose a demo API or enter a requirement first.",
                ))
            }
        };
        self.phase = Phase::AwaitingGeneration;

        let outcome = self.run(&selection).await?;
        self.phase = Phase::Rendered;
        Ok(self.outcome.insert(outcome))
    }

    /// Select and generate in one step
    pub async fn generate_for(&mut self, selection: Selection) -> Result<&GenerationOutcome> {
        self.select(selection);
        self.generate().await
    }

    async fn run(&self, selection: &Selection) -> Result<GenerationOutcome> {
        let SourceOutput {
            request,
            origin,
            notes,
        } = match selection {
            Selection::Demo(key) => SourceOutput {
                request: EndpointSource::from_demo(key)?,
                origin: SourceOrigin::Demo(key.clone()),
                notes: Vec::new(),
            },
            Selection::Custom(text) => self.source.from_free_text(text).await?,
        };
        log::info!("Generating {} from {}", request.descriptor().name, origin);

        let artifacts = self
            .renderer
            .render_all(&request, &self.settings, Utc::now())?;
        let simulated_responses = request
            .endpoints()
            .iter()
            .map(SimulatedResponse::for_endpoint)
            .collect();

        Ok(GenerationOutcome {
            descriptor: request.descriptor().clone(),
            endpoints: request.endpoints().to_vec(),
            artifacts,
            simulated_responses,
            notes,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::OPENAPI_FILE;
    use crate::source::SourceMode;
    use std::time::Duration;

    fn session(mode: SourceMode) -> Session {
        Session::new(
            EndpointSource::new(Vec::new(), mode, Duration::from_secs(1)),
            Renderer::builtin().unwrap(),
            RenderSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_todo_demo_end_to_end() {
        let mut session = session(SourceMode::Strict);
        assert_eq!(session.phase(), Phase::AwaitingChoice);

        session.select(Selection::Demo("Todo API".to_string()));
        assert_eq!(session.phase(), Phase::AwaitingGeneration);

        let outcome = session.generate().await.unwrap();
        assert_eq!(outcome.origin, SourceOrigin::Demo("Todo API".to_string()));

        let document: serde_yaml::Value =
            serde_yaml::from_str(outcome.artifacts.get(OPENAPI_FILE).unwrap()).unwrap();
        let paths = document["paths"].as_mapping().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.get("/todos").unwrap().as_mapping().unwrap().len(), 2);

        let server = outcome.artifacts.get("backend/main.py").unwrap();
        assert!(server.contains("async def list_todos("));
        assert!(server.contains("async def create_todo("));
        assert!(server.contains("@app.get(\"/health\")"));

        let client = outcome.artifacts.get("client_demo.py").unwrap();
        assert_eq!(client.matches("resp = requests.").count(), 2);
        assert_eq!(client.matches("print(resp.status_code, resp.text)").count(), 2);

        assert_eq!(
            outcome.simulated_responses,
            vec![
                SimulatedResponse {
                    message: "Called GET /todos".to_string(),
                    summary: "List todos".to_string(),
                    status: "ok".to_string(),
                },
                SimulatedResponse {
                    message: "Called POST /todos".to_string(),
                    summary: "Create todo".to_string(),
                    status: "ok".to_string(),
                },
            ]
        );
        assert_eq!(session.phase(), Phase::Rendered);
        assert!(session.outcome().is_some());
    }

    #[tokio::test]
    async fn test_changing_selection_drops_outcome() {
        let mut session = session(SourceMode::Strict);
        session
            .generate_for(Selection::Demo("Notes API".to_string()))
            .await
            .unwrap();
        session.select(Selection::Custom("tasks".to_string()));
        assert_eq!(session.phase(), Phase::AwaitingGeneration);
        assert!(session.outcome().is_none());
    }

    #[tokio::test]
    async fn test_failure_leaves_nothing_cached() {
        let mut session = session(SourceMode::Strict);
        session
            .generate_for(Selection::Demo("Todo API".to_string()))
            .await
            .unwrap();

        let err = session
            .generate_for(Selection::Custom("manage tasks".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalCapabilityUnavailable(_)));
        assert_eq!(session.phase(), Phase::AwaitingGeneration);
        assert!(session.outcome().is_none());

        let err = session
            .generate_for(Selection::Custom(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_fallback_mode_attaches_note() {
        let mut session = session(SourceMode::Fallback);
        let outcome = session
            .generate_for(Selection::Custom("manage tasks".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.origin, SourceOrigin::Fallback);
        assert_eq!(outcome.endpoints.len(), 2);
        assert_eq!(outcome.notes.len(), 1);
        assert!(outcome.artifacts.get("README.md").unwrap().starts_with("# Custom API\n"));
    }

    #[tokio::test]
    async fn test_generate_without_selection() {
        let mut session = session(SourceMode::Fallback);
        let err = session.generate().await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(session.phase(), Phase::AwaitingChoice);
    }
}
