//! Resolution of user-supplied template directories.
//!
//! Built-in templates ship inside the library. A template root may override
//! any kind by providing `<root>/<kind>/manifest.yaml` (or `manifest.toml`)
//! next to its templates. Roots are searched in this order:
//!
//! 1. The directory passed explicitly (CLI flag, config file or
//!    `CRADLE_TEMPLATE_DIR`)
//! 2. `~/.cradle/templates/`

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// A template directory overriding one template kind
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Root directory containing the templates
    root_dir: PathBuf,
    /// Path to the specific template directory (root_dir/kind)
    template_path: PathBuf,
    /// The template kind (language/framework)
    kind: TemplateKind,
}

impl TemplateDir {
    /// Create a new TemplateDir with explicit paths
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }

    /// Find an override for `kind`.
    ///
    /// Returns `Ok(None)` when no root provides this kind, in which case the
    /// built-in templates apply. An explicit root that does not exist is an
    /// error.
    pub fn discover(kind: TemplateKind, custom_root: Option<&Path>) -> io::Result<Option<Self>> {
        let root_dir = match custom_root {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("Template directory not found: {}", dir.display()),
                    ));
                }
                Some(dir.to_path_buf())
            }
            None => Self::home_template_root(),
        };

        Ok(root_dir.and_then(|root| {
            let template_path = root.join(kind.as_str());
            if template_path.is_dir() {
                Some(Self::new(root, template_path, kind))
            } else {
                None
            }
        }))
    }

    fn home_template_root() -> Option<PathBuf> {
        let root = dirs::home_dir()?.join(".cradle").join("templates");
        root.is_dir().then_some(root)
    }

    /// Get the root directory containing the templates
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the template kind
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_with_explicit_root() {
        let temp_dir = tempdir().unwrap();
        let override_dir = temp_dir.path().join("curl");
        fs::create_dir_all(&override_dir).unwrap();

        let found = TemplateDir::discover(TemplateKind::Curl, Some(temp_dir.path()))
            .unwrap()
            .unwrap();
        assert_eq!(found.template_path(), override_dir.as_path());
        assert_eq!(found.root_dir(), temp_dir.path());
        assert_eq!(found.kind(), TemplateKind::Curl);

        // Kinds the root does not provide fall back to built-ins
        let missing = TemplateDir::discover(TemplateKind::RustAxum, Some(temp_dir.path())).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_discover_rejects_missing_root() {
        let result = TemplateDir::discover(TemplateKind::Curl, Some(Path::new("/nonexistent")));
        assert!(result.is_err());
    }
}
