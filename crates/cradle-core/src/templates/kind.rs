//! Template type definitions for Cradle.
//!
//! Each template kind renders one side of the generated project: a server
//! scaffold or a client demo.
//!
//! # Examples
//!
//! ```
//! use cradle_core::templates::{TemplateKind, TemplateRole};
//! use std::str::FromStr;
//!
//! let kind = TemplateKind::from_str("python_fastapi").unwrap();
//! assert_eq!(kind, TemplateKind::PythonFastApi);
//! assert_eq!(kind.role(), TemplateRole::Server);
//! assert_eq!(kind.to_string(), "python_fastapi");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Which artifact a template kind produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateRole {
    Server,
    Client,
}

/// Supported template kinds (languages/frameworks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Python server on FastAPI
    #[serde(rename = "python_fastapi")]
    PythonFastApi,
    /// Rust server on axum
    RustAxum,
    /// Python client using requests
    PythonRequests,
    /// Shell client using curl
    Curl,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python_fastapi" => Ok(TemplateKind::PythonFastApi),
            "rust_axum" => Ok(TemplateKind::RustAxum),
            "python_requests" => Ok(TemplateKind::PythonRequests),
            "curl" => Ok(TemplateKind::Curl),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PythonFastApi => "python_fastapi",
            Self::RustAxum => "rust_axum",
            Self::PythonRequests => "python_requests",
            Self::Curl => "curl",
        }
    }

    pub fn role(&self) -> TemplateRole {
        match self {
            Self::PythonFastApi | Self::RustAxum => TemplateRole::Server,
            Self::PythonRequests | Self::Curl => TemplateRole::Client,
        }
    }

    /// Default server scaffold
    pub fn default_server() -> Self {
        Self::PythonFastApi
    }

    /// Default client demo
    pub fn default_client() -> Self {
        Self::PythonRequests
    }

    /// Returns an iterator over all available template kinds
    pub fn all() -> impl Iterator<Item = Self> {
        use TemplateKind::*;
        [PythonFastApi, RustAxum, PythonRequests, Curl].iter().copied()
    }

    /// Parse a kind and check that it plays the expected role
    pub fn parse_for(s: &str, role: TemplateRole) -> Result<Self, String> {
        let kind: Self = s.parse()?;
        if kind.role() != role {
            return Err(format!("{} is not a {:?} template", kind, role).to_lowercase());
        }
        Ok(kind)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
