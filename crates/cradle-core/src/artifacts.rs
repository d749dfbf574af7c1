//! The rendered file set and its packaging.

use std::io::{Cursor, Write};
use std::path::Path;

use tokio::fs;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::manifest::is_project_relative;

/// File name of the OpenAPI document
pub const OPENAPI_FILE: &str = "openapi.yaml";

/// File name of the readme
pub const README_FILE: &str = "README.md";

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the project root, always with `/` separators
    pub name: String,
    pub content: String,
}

/// Ordered mapping from file name to content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    files: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing the content of an existing file with the same
    /// name in place
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.content = content,
            None => self.files.push(Artifact { name, content }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.files.iter()
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Package every file into a deflated zip archive
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        for file in &self.files {
            writer.start_file(file.name.as_str(), options)?;
            writer.write_all(file.content.as_bytes())?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Write every file below `dir`, creating directories as needed
    pub async fn write_to_dir(&self, dir: &Path) -> Result<()> {
        for file in &self.files {
            if !is_project_relative(&file.name) {
                return Err(Error::render(format!(
                    "artifact {} would be written outside {}",
                    file.name,
                    dir.display()
                )));
            }
            let target = dir.join(&file.name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            log::debug!("Writing {}", target.display());
            fs::write(&target, &file.content).await?;
        }
        Ok(())
    }
}

/// Stem used when nothing of the API name survives sanitizing
const DEFAULT_FILE_STEM: &str = "Custom_API";

/// Single path component derived from the API name.
///
/// Spaces become underscores and anything outside `[A-Za-z0-9_-]` is
/// dropped, so a provider-chosen name cannot point outside the working
/// directory.
pub fn project_dir_name(api_name: &str) -> String {
    let stem: String = api_name
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect();
    let stem = stem.trim_start_matches('-');
    if stem.is_empty() || !is_project_relative(stem) {
        DEFAULT_FILE_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Download name of the archive, e.g. `Todo_API_cradle.zip`
pub fn archive_file_name(api_name: &str) -> String {
    format!("{}_cradle.zip", project_dir_name(api_name))
}
