//! Loading and rendering of code generation templates

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::manifest::TemplateManifest;

use super::{builtin, TemplateDir, TemplateKind};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Where a template set was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Builtin,
    Directory(PathBuf),
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the generated project root
    pub destination: String,
    pub content: String,
}

#[derive(Debug, Clone)]
struct TemplateSet {
    manifest: TemplateManifest,
    origin: TemplateOrigin,
}

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Loaded template sets by kind
    sets: HashMap<TemplateKind, TemplateSet>,
}

impl TemplateManager {
    /// Load the given template kinds.
    ///
    /// Each kind comes from `custom_root` (or `~/.cradle/templates`) when that
    /// root provides it, and from the built-in set otherwise.
    pub async fn new(kinds: &[TemplateKind], custom_root: Option<PathBuf>) -> Result<Self> {
        let mut tera = new_engine();
        let mut sets = HashMap::new();

        for &kind in kinds {
            let set = match TemplateDir::discover(kind, custom_root.as_deref())? {
                Some(dir) => {
                    log::info!("Using {} templates from {}", kind, dir.display());
                    let manifest = TemplateManifest::load_from_dir(dir.template_path()).await?;
                    let mut sources = Vec::with_capacity(manifest.files.len());
                    for file in &manifest.files {
                        let path = dir.template_path().join(&file.source);
                        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                            Error::template(format!(
                                "Failed to read template {}: {}",
                                path.display(),
                                e
                            ))
                        })?;
                        sources.push((template_name(kind, &file.source), content));
                    }
                    tera.add_raw_templates(sources)?;
                    TemplateSet {
                        manifest,
                        origin: TemplateOrigin::Directory(dir.template_path().to_path_buf()),
                    }
                }
                None => load_builtin(&mut tera, kind)?,
            };
            sets.insert(kind, set);
        }

        Ok(Self {
            tera: Arc::new(tera),
            sets,
        })
    }

    /// Load only the templates compiled into the library
    pub fn builtin(kinds: &[TemplateKind]) -> Result<Self> {
        let mut tera = new_engine();
        let mut sets = HashMap::new();
        for &kind in kinds {
            sets.insert(kind, load_builtin(&mut tera, kind)?);
        }
        Ok(Self {
            tera: Arc::new(tera),
            sets,
        })
    }

    /// Get the manifest of a loaded kind
    pub fn manifest(&self, kind: TemplateKind) -> Option<&TemplateManifest> {
        self.sets.get(&kind).map(|set| &set.manifest)
    }

    /// Get the origin of a loaded kind
    pub fn origin(&self, kind: TemplateKind) -> Option<&TemplateOrigin> {
        self.sets.get(&kind).map(|set| &set.origin)
    }

    /// Render every file of a template kind with the given context
    pub fn render<T: Serialize>(&self, kind: TemplateKind, context: &T) -> Result<Vec<RenderedFile>> {
        let set = self
            .sets
            .get(&kind)
            .ok_or_else(|| Error::render(format!("Template kind {} is not loaded", kind)))?;
        let tera_context = Context::from_serialize(context).map_err(|e| {
            Error::render(format!("Failed to serialize context: {}", error_chain(&e)))
        })?;

        let mut rendered = Vec::with_capacity(set.manifest.files.len());
        for file in &set.manifest.files {
            let name = template_name(kind, &file.source);
            log::debug!("Rendering template {} -> {}", name, file.destination);
            let content = self.tera.render(&name, &tera_context).map_err(|e| {
                let message = format!("Failed to render template '{}': {}", name, error_chain(&e));
                log::error!("{}", message);
                match &set.origin {
                    TemplateOrigin::Builtin => Error::render(message),
                    TemplateOrigin::Directory(_) => Error::template(message),
                }
            })?;
            rendered.push(RenderedFile {
                destination: file.destination.clone(),
                content,
            });
        }
        Ok(rendered)
    }
}

fn new_engine() -> Tera {
    let mut tera = Tera::default();
    // Escaping is done per target language by the context builders
    tera.autoescape_on(vec![]);
    tera
}

fn load_builtin(tera: &mut Tera, kind: TemplateKind) -> Result<TemplateSet> {
    let templates = builtin(kind);
    let manifest = TemplateManifest::from_yaml_str(templates.manifest)?;
    tera.add_raw_templates(
        templates
            .sources
            .iter()
            .map(|(source, content)| (template_name(kind, source), *content)),
    )?;
    Ok(TemplateSet {
        manifest,
        origin: TemplateOrigin::Builtin,
    })
}

fn template_name(kind: TemplateKind, source: &str) -> String {
    format!("{}/{}", kind.as_str(), source)
}

/// Flatten a Tera error and its causes into one line
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut current: &dyn std::error::Error = err;
    while let Some(source) = current.source() {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source;
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_sets_load() {
        let manager = TemplateManager::builtin(&TemplateKind::all().collect::<Vec<_>>()).unwrap();
        for kind in TemplateKind::all() {
            assert_eq!(manager.origin(kind), Some(&TemplateOrigin::Builtin));
            assert!(manager.manifest(kind).is_some());
        }
        let fastapi = manager.manifest(TemplateKind::PythonFastApi).unwrap();
        assert!(fastapi
            .files
            .iter()
            .any(|f| f.source == "main.py.tera" && f.destination == "backend/main.py"));
        let axum = manager.manifest(TemplateKind::RustAxum).unwrap();
        assert!(axum
            .files
            .iter()
            .any(|f| f.destination == "backend/src/main.rs"));
    }

    #[test]
    fn test_render_unloaded_kind_is_render_error() {
        let manager = TemplateManager::builtin(&[TemplateKind::Curl]).unwrap();
        let err = manager
            .render(TemplateKind::RustAxum, &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[tokio::test]
    async fn test_custom_directory_overrides_one_kind() -> crate::Result<()> {
        let root = tempdir()?;
        let curl_dir = root.path().join("curl");
        tokio::fs::create_dir_all(&curl_dir).await?;
        tokio::fs::write(
            curl_dir.join("manifest.yaml"),
            "name: custom-curl\nlanguage: shell\nfiles:\n  - source: demo.sh.tera\n    destination: scripts/demo.sh\n",
        )
        .await?;
        tokio::fs::write(curl_dir.join("demo.sh.tera"), "echo {{ api.title }}\n").await?;

        let manager = TemplateManager::new(
            &[TemplateKind::Curl, TemplateKind::PythonFastApi],
            Some(root.path().to_path_buf()),
        )
        .await?;
        assert_eq!(
            manager.origin(TemplateKind::Curl),
            Some(&TemplateOrigin::Directory(curl_dir.clone()))
        );
        assert_eq!(
            manager.origin(TemplateKind::PythonFastApi),
            Some(&TemplateOrigin::Builtin)
        );

        let files = manager.render(TemplateKind::Curl, &json!({"api": {"title": "Todo API"}}))?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].destination, "scripts/demo.sh");
        assert_eq!(files[0].content.trim_end(), "echo Todo API");
        Ok(())
    }

    #[tokio::test]
    async fn test_broken_custom_template_is_template_error() -> crate::Result<()> {
        let root = tempdir()?;
        let curl_dir = root.path().join("curl");
        tokio::fs::create_dir_all(&curl_dir).await?;
        tokio::fs::write(
            curl_dir.join("manifest.yaml"),
            "name: broken\nlanguage: shell\nfiles:\n  - source: demo.sh.tera\n    destination: demo.sh\n",
        )
        .await?;
        tokio::fs::write(curl_dir.join("demo.sh.tera"), "{{ missing.value }}\n").await?;

        let manager =
            TemplateManager::new(&[TemplateKind::Curl], Some(root.path().to_path_buf())).await?;
        let err = manager.render(TemplateKind::Curl, &json!({})).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
        Ok(())
    }
}
