//! Manifest file format for Cradle templates.
//!
//! This module defines the structure of the `manifest.yaml` file that describes
//! which files a template set renders and where they land in the generated
//! project.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

/// The root manifest structure for a template.
///
/// This describes the template's metadata and the files it contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// The name of the template
    pub name: String,

    /// A short description of what the template generates
    #[serde(default)]
    pub description: String,

    /// The version of the template (should follow semantic versioning)
    #[serde(default = "default_version")]
    pub version: String,

    /// The target programming language (e.g., "python", "rust")
    pub language: String,

    /// List of files to generate
    pub files: Vec<TemplateFile>,
}

/// Describes a single file to be generated from a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Path to the template file, relative to the template directory
    pub source: String,

    /// Destination path for the generated file, relative to the project root
    pub destination: String,
}

fn default_version() -> String {
    String::from("0.1.0")
}

impl TemplateManifest {
    /// Parse a YAML manifest.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a template manifest from a directory.
    ///
    /// Looks for `manifest.yaml`, then `manifest.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither file exists, can't be read, contains
    /// invalid YAML/TOML, or lists a destination outside the project.
    pub async fn load_from_dir(template_dir: &Path) -> Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        let manifest: Self = if yaml_path.exists() {
            log::debug!("Reading template manifest {}", yaml_path.display());
            let content = fs::read_to_string(&yaml_path).await?;
            serde_yaml::from_str(&content).map_err(|e| {
                Error::template(format!(
                    "Invalid YAML in template manifest at {}: {}",
                    yaml_path.display(),
                    e
                ))
            })?
        } else if toml_path.exists() {
            log::debug!("Reading template manifest {}", toml_path.display());
            let content = fs::read_to_string(&toml_path).await?;
            toml::from_str(&content)?
        } else {
            return Err(Error::template(format!(
                "No manifest.yaml or manifest.toml in {}",
                template_dir.display()
            )));
        };

        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::template(format!(
                "Template manifest {} lists no files",
                self.name
            )));
        }
        for file in &self.files {
            if !is_project_relative(&file.destination) {
                return Err(Error::template(format!(
                    "Template destination {} must be a relative path inside the project",
                    file.destination
                )));
            }
        }
        Ok(())
    }
}

/// True when `path` is relative and never climbs out of its base
pub fn is_project_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
