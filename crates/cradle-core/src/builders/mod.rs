//! Context builder traits and adapters for language-specific codegen.
//!
//! Templates never see raw user text in a code position. Every string that
//! lands inside generated source goes through the target language's
//! [`ContextBuilder::string_literal`], and every handler name through
//! [`ContextBuilder::safe_identifier`].
pub mod python;
pub mod rust;
pub mod shell;

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::endpoint::{Endpoint, GenerationRequest};
use crate::error::{Error, Result};
use crate::templates::TemplateKind;
use crate::utils::{collapse_whitespace, sanitize_identifier};

/// Value substituted for path parameters in client calls
pub const SAMPLE_PATH_VALUE: &str = "1";

/// Inputs to a template context besides the request itself
#[derive(Debug, Clone)]
pub struct ContextSettings {
    /// Base URL the client demo talks to
    pub base_url: String,
    /// Timestamp embedded in the server health check
    pub generated_at: DateTime<Utc>,
}

/// API-level template values
#[derive(Debug, Clone, Serialize)]
pub struct ApiContext {
    pub title: String,
    pub title_literal: String,
    pub version: String,
    pub version_literal: String,
    /// Description collapsed onto one line, safe inside a line comment
    pub description: String,
    pub base_url: String,
    pub base_url_literal: String,
    pub generated_at: String,
    pub generated_at_literal: String,
    /// Package name for generated projects
    pub package_name: String,
}

/// Per-endpoint template values
#[derive(Debug, Clone, Serialize)]
pub struct EndpointTemplateContext {
    pub method_upper: String,
    pub method_lower: String,
    /// Normalized path as it appears in the OpenAPI document
    pub path: String,
    /// Path in the server framework's route syntax, quoted
    pub route_literal: String,
    pub fn_name: String,
    /// Summary on one line, safe inside a line comment
    pub summary: String,
    pub summary_literal: String,
    pub handler_params: String,
    /// Concrete path used by the client demo, quoted
    pub call_path_literal: String,
}

/// One route with every method registered on it
#[derive(Debug, Clone, Serialize)]
pub struct RouteContext {
    pub route_literal: String,
    pub methods: Vec<RouteMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteMethod {
    pub method_lower: String,
    pub fn_name: String,
}

/// The full context handed to a template set
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub api: ApiContext,
    pub endpoints: Vec<EndpointTemplateContext>,
    pub routes: Vec<RouteContext>,
    /// Lowercase methods in use, plus `get` for the health route
    pub methods_used: Vec<String>,
}

/// Trait for converting a generation request into a language-specific context.
pub trait ContextBuilder: Send + Sync {
    /// Quote `text` as a string literal of the target language
    fn string_literal(&self, text: &str) -> String;

    /// Rewrite an already sanitized identifier so it cannot collide with a
    /// keyword or a name the scaffold defines itself
    fn safe_identifier(&self, name: &str) -> String;

    /// Handler parameter list for the given path parameters
    fn handler_params(&self, params: &[&str]) -> String;

    /// Path in the target framework's route syntax
    fn route(&self, path: &str) -> String {
        path.to_string()
    }

    /// Pass every `{param}` through [`safe_identifier`](Self::safe_identifier)
    /// and return the rewritten path with the handler argument names, so the
    /// route and the handler signature name each parameter the same way.
    fn rename_path_params(&self, path: &str) -> (String, Vec<String>) {
        let mut params: Vec<String> = Vec::new();
        let segments: Vec<String> = path
            .split('/')
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => {
                    let name = self.safe_identifier(param);
                    let segment = format!("{{{}}}", name);
                    params.push(name);
                    segment
                }
                None => segment.to_string(),
            })
            .collect();
        (segments.join("/"), params)
    }

    fn build_endpoint(&self, endpoint: &Endpoint) -> Result<EndpointTemplateContext> {
        let fn_name = self.safe_identifier(endpoint.function_name());
        if !is_identifier(&fn_name) {
            return Err(Error::render(format!(
                "handler name {:?} for {} {} is not a legal identifier",
                fn_name,
                endpoint.method(),
                endpoint.path()
            )));
        }
        let (route_path, params) = self.rename_path_params(endpoint.path());
        let params: Vec<&str> = params.iter().map(String::as_str).collect();

        Ok(EndpointTemplateContext {
            method_upper: endpoint.method().as_upper().to_string(),
            method_lower: endpoint.method().as_lower().to_string(),
            path: endpoint.path().to_string(),
            route_literal: self.string_literal(&self.route(&route_path)),
            fn_name,
            summary: endpoint.summary().to_string(),
            summary_literal: self.string_literal(endpoint.summary()),
            handler_params: self.handler_params(&params),
            call_path_literal: self.string_literal(&sample_call_path(endpoint.path())),
        })
    }

    fn build(&self, request: &GenerationRequest, settings: &ContextSettings) -> Result<TemplateContext> {
        let descriptor = request.descriptor();
        let generated_at = settings
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let api = ApiContext {
            title: collapse_whitespace(&descriptor.name),
            title_literal: self.string_literal(&descriptor.name),
            version: collapse_whitespace(&descriptor.version),
            version_literal: self.string_literal(&descriptor.version),
            description: collapse_whitespace(&descriptor.description),
            base_url: settings.base_url.clone(),
            base_url_literal: self.string_literal(&settings.base_url),
            generated_at_literal: self.string_literal(&generated_at),
            generated_at,
            package_name: sanitize_identifier(&descriptor.name)
                .unwrap_or_else(|| "generated_api".to_string()),
        };

        let endpoints = request
            .endpoints()
            .iter()
            .map(|e| self.build_endpoint(e))
            .collect::<Result<Vec<_>>>()?;

        // Group by route, keeping first-seen order
        let mut routes: Vec<RouteContext> = Vec::new();
        for endpoint in &endpoints {
            let method = RouteMethod {
                method_lower: endpoint.method_lower.clone(),
                fn_name: endpoint.fn_name.clone(),
            };
            match routes
                .iter_mut()
                .find(|r| r.route_literal == endpoint.route_literal)
            {
                Some(route) => route.methods.push(method),
                None => routes.push(RouteContext {
                    route_literal: endpoint.route_literal.clone(),
                    methods: vec![method],
                }),
            }
        }

        let methods_used: BTreeSet<String> = endpoints
            .iter()
            .map(|e| e.method_lower.clone())
            .chain(std::iter::once("get".to_string()))
            .collect();

        Ok(TemplateContext {
            api,
            endpoints,
            routes,
            methods_used: methods_used.into_iter().collect(),
        })
    }
}

/// Look up the builder for a template kind
pub fn get_builder(kind: TemplateKind) -> Box<dyn ContextBuilder> {
    match kind {
        TemplateKind::PythonFastApi | TemplateKind::PythonRequests => {
            Box::new(python::PythonContextBuilder)
        }
        TemplateKind::RustAxum => Box::new(rust::RustContextBuilder),
        TemplateKind::Curl => Box::new(shell::ShellContextBuilder),
    }
}

/// Replace every `{param}` segment with a sample value
pub fn sample_call_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                SAMPLE_PATH_VALUE
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// ASCII identifier check shared by every target language
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Append `_` when `name` is in `reserved`
pub(crate) fn avoid_reserved(name: &str, reserved: &[&str]) -> String {
    if reserved.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{ApiDescriptor, HttpMethod};
    use chrono::TimeZone;

    fn settings() -> ContextSettings {
        ContextSettings {
            base_url: "http://localhost:8000".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            ApiDescriptor::new("Todo API", "0.1.0", "Todos\nand more"),
            vec![
                Endpoint::new(HttpMethod::Get, "/todos", "List todos", Some("list_todos")).unwrap(),
                Endpoint::new(HttpMethod::Post, "/todos", "Create todo", Some("create_todo"))
                    .unwrap(),
                Endpoint::new(HttpMethod::Delete, "/todos/{id}", "Delete todo", None).unwrap(),
            ],
        )
    }

    #[test]
    fn test_sample_call_path() {
        assert_eq!(sample_call_path("/todos/{id}"), "/todos/1");
        assert_eq!(sample_call_path("/a/{x}/b/{y}"), "/a/1/b/1");
        assert_eq!(sample_call_path("/"), "/");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("list_todos"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_routes_group_methods_by_path() {
        let context = python::PythonContextBuilder
            .build(&request(), &settings())
            .unwrap();
        assert_eq!(context.routes.len(), 2);
        assert_eq!(context.routes[0].methods.len(), 2);
        assert_eq!(context.methods_used, vec!["delete", "get", "post"]);
        assert_eq!(context.api.description, "Todos and more");
        assert_eq!(context.api.generated_at, "2024-01-02T03:04:05Z");
        assert_eq!(context.api.package_name, "todo_api");
    }

    #[test]
    fn test_context_serializes_for_every_kind() {
        for kind in TemplateKind::all() {
            let context = get_builder(kind).build(&request(), &settings()).unwrap();
            let value = serde_json::to_value(&context).unwrap();
            assert_eq!(value["endpoints"].as_array().map(Vec::len), Some(3));
            assert_eq!(value["api"]["title"], "Todo API");
        }
    }
}
