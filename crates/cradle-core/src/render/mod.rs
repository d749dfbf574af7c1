//! Artifact renderers.
//!
//! The OpenAPI document is built as data and serialized. Server scaffolds and
//! client demos come from templates fed by the per-language context builders.
//! All three see the same [`GenerationRequest`], so paths, methods and
//! handler names agree across every artifact.

pub mod openapi;

pub use openapi::render_openapi;

use chrono::{DateTime, Utc};

use crate::artifacts::{ArtifactSet, OPENAPI_FILE, README_FILE};
use crate::builders::{get_builder, ContextSettings};
use crate::config::{Config, DEFAULT_CLIENT_BASE_URL};
use crate::endpoint::GenerationRequest;
use crate::error::{Error, Result};
use crate::templates::{RenderedFile, TemplateKind, TemplateManager, TemplateRole};

/// Which templates to use and where the client points
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub server: TemplateKind,
    pub client: TemplateKind,
    pub base_url: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            server: TemplateKind::default_server(),
            client: TemplateKind::default_client(),
            base_url: DEFAULT_CLIENT_BASE_URL.to_string(),
        }
    }
}

impl From<&Config> for RenderSettings {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server_template,
            client: config.client_template,
            base_url: config.client_base_url.clone(),
        }
    }
}

/// Renders every artifact of a request
#[derive(Debug, Clone)]
pub struct Renderer {
    templates: TemplateManager,
}

impl Renderer {
    pub fn new(templates: TemplateManager) -> Self {
        Self { templates }
    }

    /// Renderer over the built-in templates of every kind
    pub fn builtin() -> Result<Self> {
        let kinds: Vec<_> = TemplateKind::all().collect();
        Ok(Self::new(TemplateManager::builtin(&kinds)?))
    }

    /// Render the server scaffold files
    pub fn render_server(
        &self,
        request: &GenerationRequest,
        kind: TemplateKind,
        settings: &ContextSettings,
    ) -> Result<Vec<RenderedFile>> {
        self.render_role(request, kind, TemplateRole::Server, settings)
    }

    /// Render the client demo files
    pub fn render_client(
        &self,
        request: &GenerationRequest,
        kind: TemplateKind,
        settings: &ContextSettings,
    ) -> Result<Vec<RenderedFile>> {
        self.render_role(request, kind, TemplateRole::Client, settings)
    }

    fn render_role(
        &self,
        request: &GenerationRequest,
        kind: TemplateKind,
        role: TemplateRole,
        settings: &ContextSettings,
    ) -> Result<Vec<RenderedFile>> {
        if kind.role() != role {
            return Err(Error::config(format!(
                "{} cannot render the {:?} side",
                kind, role
            )));
        }
        if let (Some(manifest), Some(origin)) =
            (self.templates.manifest(kind), self.templates.origin(kind))
        {
            log::debug!("Rendering {} with template set {} ({:?})", kind, manifest.name, origin);
        }
        let context = get_builder(kind).build(request, settings)?;
        self.templates.render(kind, &context)
    }

    /// Render the OpenAPI document, server, client and readme.
    ///
    /// `generated_at` only reaches the server health check.
    pub fn render_all(
        &self,
        request: &GenerationRequest,
        settings: &RenderSettings,
        generated_at: DateTime<Utc>,
    ) -> Result<ArtifactSet> {
        let context_settings = ContextSettings {
            base_url: settings.base_url.clone(),
            generated_at,
        };
        let server = self.render_server(request, settings.server, &context_settings)?;
        let client = self.render_client(request, settings.client, &context_settings)?;

        let mut artifacts = ArtifactSet::new();
        artifacts.insert(OPENAPI_FILE, render_openapi(request)?);
        for file in server.iter().chain(client.iter()) {
            if artifacts.get(&file.destination).is_some() {
                return Err(Error::template(format!(
                    "two templates write {}",
                    file.destination
                )));
            }
            artifacts.insert(file.destination.clone(), file.content.clone());
        }
        let file_names: Vec<String> = artifacts.file_names().into_iter().map(String::from).collect();
        artifacts.insert(README_FILE, render_readme(request, &file_names));

        log::info!(
            "Rendered {} files for {} ({} endpoints)",
            artifacts.len(),
            request.descriptor().name,
            request.endpoints().len()
        );
        Ok(artifacts)
    }
}

/// Short readme: title, description, endpoints and the generated files
pub fn render_readme(request: &GenerationRequest, files: &[String]) -> String {
    let descriptor = request.descriptor();
    let mut readme = format!("# {}\n\n{}\n", descriptor.name, descriptor.description);

    readme.push_str("\n## Endpoints\n\n");
    for endpoint in request.endpoints() {
        readme.push_str(&format!("- `{} {}`", endpoint.method(), endpoint.path()));
        if !endpoint.summary().is_empty() {
            readme.push_str(&format!(" - {}", endpoint.summary()));
        }
        readme.push('\n');
    }

    if !files.is_empty() {
        readme.push_str("\n## Files\n\n");
        for file in files {
            readme.push_str(&format!("- `{}`\n", file));
        }
    }
    readme
}
