//! Error handling for the Cradle generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! Four variants carry the domain failure kinds of a generation action:
//!
//! - [`Error::InvalidInput`]: the caller supplied an empty requirement or an
//!   unknown demo key. Reported before any external call.
//! - [`Error::ExternalCapabilityUnavailable`]: no credential, no reachable
//!   provider, or the provider timed out.
//! - [`Error::MalformedResponse`]: a provider answered with something that is
//!   not a usable endpoint list.
//! - [`Error::Render`]: an internal invariant broke while rendering artifacts.
//!
//! # Examples
//!
//! ```
//! use cradle_core::error::{Error, Result};
//!
//! fn require(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(Error::invalid_input("requirement must not be empty"));
//!     }
//!     Ok(text)
//! }
//!
//! assert!(require("").is_err());
//! ```

use thiserror::Error;

/// Result type for Cradle generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Cradle generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Archive packaging error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller supplied input that cannot start a generation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No generation provider could be reached or configured
    #[error("External generation capability unavailable: {0}")]
    ExternalCapabilityUnavailable(String),

    /// A generation provider answered with an unusable endpoint list
    #[error("Malformed response from generation capability: {0}")]
    MalformedResponse(String),

    /// An invariant broke while rendering artifacts
    #[error("Unexpected rendering failure: {0}")]
    Render(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new capability unavailable error
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ExternalCapabilityUnavailable(msg.into())
    }

    /// Create a new malformed response error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::ExternalCapabilityUnavailable(err.to_string())
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pick_the_right_variant() {
        assert!(matches!(Error::invalid_input("x"), Error::InvalidInput(_)));
        assert!(matches!(
            Error::unavailable("x"),
            Error::ExternalCapabilityUnavailable(_)
        ));
        assert!(matches!(Error::malformed("x"), Error::MalformedResponse(_)));
        assert!(matches!(Error::render("x"), Error::Render(_)));
    }

    #[test]
    fn test_messages_are_actionable() {
        let err = Error::invalid_input("Please enter a requirement");
        assert_eq!(err.to_string(), "Invalid input: Please enter a requirement");
    }
}
