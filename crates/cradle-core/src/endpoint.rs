//! The endpoint model shared by every generated artifact.
//!
//! Endpoint descriptions arrive loosely shaped (a curated catalog, a rule-based
//! fallback, or JSON produced by a language model). Everything downstream works
//! on the validated [`Endpoint`] record instead: the path is normalized, the
//! method is one of [`HttpMethod`], and the function name is always a safe
//! lowercase identifier.
//!
//! A [`GenerationRequest`] bundles the [`ApiDescriptor`] with the ordered
//! endpoint list and enforces that every `(method, path)` pair and every
//! function name appears once.

// Internal imports (std, crate)
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::{collapse_whitespace, sanitize_identifier};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use url::Url;

/// Display title used when a source does not name the API
pub const DEFAULT_API_NAME: &str = "Custom API";

/// Version used when a source does not version the API
pub const DEFAULT_API_VERSION: &str = "0.1.0";

/// Description used when a source does not describe the API
pub const DEFAULT_API_DESCRIPTION: &str = "Generated from natural language requirement.";

/// HTTP methods an endpoint may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Uppercase form, used for display
    pub fn as_upper(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Lowercase form, used for code generation and OpenAPI keys
    pub fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upper())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_upper().to_string()
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Endpoint as delivered by an untrusted source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEndpoint {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "functionName", alias = "func_name")]
    pub function_name: Option<String>,
}

/// One HTTP route + method pair with a summary and a handler identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    path: String,
    method: HttpMethod,
    summary: String,
    function_name: String,
}

impl Endpoint {
    /// Build a validated endpoint.
    ///
    /// The path is normalized (see [`normalize_path`]). A missing or unsafe
    /// function name is sanitized, or derived from method and path when
    /// nothing usable is left.
    pub fn new(
        method: HttpMethod,
        path: &str,
        summary: &str,
        function_name: Option<&str>,
    ) -> Result<Self> {
        let path = normalize_path(path)?;
        let function_name = function_name
            .and_then(sanitize_identifier)
            .unwrap_or_else(|| derive_function_name(method, &path));
        Ok(Self {
            path,
            method,
            summary: collapse_whitespace(summary),
            function_name,
        })
    }

    /// Validate an endpoint received from an external source.
    pub fn from_raw(raw: &RawEndpoint) -> Result<Self> {
        let path = raw
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::malformed("endpoint is missing a path"))?;
        let method = raw
            .method
            .as_deref()
            .ok_or_else(|| Error::malformed(format!("endpoint {} is missing a method", path)))?
            .parse::<HttpMethod>()
            .map_err(|e| Error::malformed(format!("endpoint {}: {}", path, e)))?;
        Self::new(
            method,
            path,
            raw.summary.as_deref().unwrap_or_default(),
            raw.function_name.as_deref(),
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Names of the `{param}` segments of the path, in order
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }

    fn key(&self) -> (HttpMethod, String) {
        (self.method, self.path.clone())
    }
}

/// Normalize a route path.
///
/// Leading `/` is added when missing, empty segments are dropped, absolute
/// URLs are reduced to their path, query strings are removed and `:param`
/// segments are rewritten to `{param}`. `/` alone is the root route. A
/// parameter name may appear only once.
pub fn normalize_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::malformed("endpoint path is empty"));
    }

    let path = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Url::parse(trimmed)
            .map_err(|e| Error::malformed(format!("invalid endpoint URL {}: {}", trimmed, e)))?
            .path()
            .to_string()
    } else {
        trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string()
    };

    let mut segments: Vec<String> = Vec::new();
    for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
        let segment = normalize_segment(segment, raw)?;
        if segment.starts_with('{') && segments.contains(&segment) {
            return Err(Error::malformed(format!(
                "path {} repeats the parameter {}",
                raw, segment
            )));
        }
        segments.push(segment);
    }

    Ok(format!("/{}", segments.join("/")))
}

fn normalize_segment(segment: &str, raw: &str) -> Result<String> {
    let param = segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .or_else(|| segment.strip_prefix(':'));
    if let Some(name) = param {
        let name = sanitize_identifier(name).ok_or_else(|| {
            Error::malformed(format!("path {} has an unusable parameter name", raw))
        })?;
        return Ok(format!("{{{}}}", name));
    }

    let segment = segment.replace(char::is_whitespace, "-");
    let legal = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~');
    if !segment.chars().all(legal) {
        return Err(Error::malformed(format!(
            "path {} contains characters that cannot appear in a route",
            raw
        )));
    }
    Ok(segment)
}

/// Derive a handler name from method and path, e.g. `GET /todos/{id}` ->
/// `get_todos_by_id`.
pub fn derive_function_name(method: HttpMethod, path: &str) -> String {
    let words: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => format!("by_{}", param),
            None => segment.to_string(),
        })
        .collect();
    let tail = sanitize_identifier(&words.join("_")).unwrap_or_else(|| "root".to_string());
    format!("{}_{}", method.as_lower(), tail)
}

/// Title, version and description of the generated API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl ApiDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }

    /// Build a descriptor from optional parts, filling in defaults for
    /// anything missing or blank.
    pub fn with_defaults(
        name: Option<&str>,
        version: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        let pick = |value: Option<&str>, default: &str| {
            value
                .map(collapse_whitespace)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            name: pick(name, DEFAULT_API_NAME),
            version: pick(version, DEFAULT_API_VERSION),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_API_DESCRIPTION)
                .to_string(),
        }
    }
}

impl Default for ApiDescriptor {
    fn default() -> Self {
        Self::with_defaults(None, None, None)
    }
}

/// The transient unit passed through the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    descriptor: ApiDescriptor,
    endpoints: Vec<Endpoint>,
}

impl GenerationRequest {
    /// Bundle a descriptor with its endpoints.
    ///
    /// A repeated `(method, path)` pair keeps the position of its first
    /// occurrence and the contents of its last. Colliding function names get
    /// a numeric suffix so each handler is defined once.
    pub fn new(descriptor: ApiDescriptor, endpoints: Vec<Endpoint>) -> Self {
        let mut unique: Vec<Endpoint> = Vec::with_capacity(endpoints.len());
        let mut positions: HashMap<(HttpMethod, String), usize> = HashMap::new();
        for endpoint in endpoints {
            match positions.get(&endpoint.key()) {
                Some(&index) => {
                    log::debug!(
                        "Duplicate endpoint {} {} overrides earlier entry",
                        endpoint.method,
                        endpoint.path
                    );
                    unique[index] = endpoint;
                }
                None => {
                    positions.insert(endpoint.key(), unique.len());
                    unique.push(endpoint);
                }
            }
        }

        let mut taken = HashSet::new();
        for endpoint in &mut unique {
            let base = endpoint.function_name.clone();
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{}_{}", base, n);
                n += 1;
            }
            endpoint.function_name = candidate;
        }

        Self {
            descriptor,
            endpoints: unique,
        }
    }

    pub fn descriptor(&self) -> &ApiDescriptor {
        &self.descriptor
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}
