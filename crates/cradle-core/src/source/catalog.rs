//! Built-in demo APIs and the rule-based fallback endpoint list.

use crate::endpoint::{ApiDescriptor, Endpoint, GenerationRequest, HttpMethod, DEFAULT_API_VERSION};
use crate::endpoint::HttpMethod::{Get, Post};
use crate::error::{Error, Result};

/// A curated endpoint entry
#[derive(Debug, Clone, Copy)]
pub struct CatalogEndpoint {
    pub method: HttpMethod,
    pub path: &'static str,
    pub summary: &'static str,
    pub function_name: &'static str,
}

impl CatalogEndpoint {
    const fn new(
        method: HttpMethod,
        path: &'static str,
        summary: &'static str,
        function_name: &'static str,
    ) -> Self {
        Self {
            method,
            path,
            summary,
            function_name,
        }
    }

    fn to_endpoint(self) -> Result<Endpoint> {
        Endpoint::new(self.method, self.path, self.summary, Some(self.function_name))
    }
}

/// A demo API from the built-in catalog
#[derive(Debug, Clone, Copy)]
pub struct DemoApi {
    pub key: &'static str,
    pub endpoints: &'static [CatalogEndpoint],
}

impl DemoApi {
    /// Description attached to every demo
    pub fn description(&self) -> String {
        format!("Auto-generated {} using free LLM engine.", self.key)
    }

    /// Build the generation request for this demo
    pub fn request(&self) -> Result<GenerationRequest> {
        let descriptor = ApiDescriptor::new(self.key, DEFAULT_API_VERSION, self.description());
        let endpoints = self
            .endpoints
            .iter()
            .map(|e| e.to_endpoint())
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::render(format!("demo catalog entry {} is invalid: {}", self.key, e)))?;
        Ok(GenerationRequest::new(descriptor, endpoints))
    }
}

/// The demo catalog, in display order
pub static DEMO_APIS: &[DemoApi] = &[
    DemoApi {
        key: "Todo API",
        endpoints: &[
            CatalogEndpoint::new(Get, "/todos", "List todos", "list_todos"),
            CatalogEndpoint::new(Post, "/todos", "Create todo", "create_todo"),
        ],
    },
    DemoApi {
        key: "Notes API",
        endpoints: &[
            CatalogEndpoint::new(Get, "/notes", "List notes", "list_notes"),
            CatalogEndpoint::new(Post, "/notes", "Create note", "create_note"),
        ],
    },
    DemoApi {
        key: "Calculator API",
        endpoints: &[
            CatalogEndpoint::new(Get, "/add", "Add two numbers", "add"),
            CatalogEndpoint::new(Get, "/multiply", "Multiply two numbers", "multiply"),
        ],
    },
];

/// Endpoints substituted when no generation provider produced anything usable
pub static FALLBACK_ENDPOINTS: &[CatalogEndpoint] = &[
    CatalogEndpoint::new(Get, "/items", "List items", "list_items"),
    CatalogEndpoint::new(Post, "/items", "Create item", "create_item"),
];

/// Keys of every demo, in display order
pub fn demo_keys() -> impl Iterator<Item = &'static str> {
    DEMO_APIS.iter().map(|demo| demo.key)
}

/// Look a demo up by key: exact match first, then case-insensitive.
pub fn find_demo(key: &str) -> Option<&'static DemoApi> {
    let key = key.trim();
    DEMO_APIS
        .iter()
        .find(|demo| demo.key == key)
        .or_else(|| DEMO_APIS.iter().find(|demo| demo.key.eq_ignore_ascii_case(key)))
}

/// The fixed fallback request. The requirement text is deliberately ignored.
pub fn fallback_request() -> Result<GenerationRequest> {
    let endpoints = FALLBACK_ENDPOINTS
        .iter()
        .map(|e| e.to_endpoint())
        .collect::<Result<Vec<_>>>()
        .map_err(|e| Error::render(format!("fallback endpoint is invalid: {}", e)))?;
    Ok(GenerationRequest::new(ApiDescriptor::default(), endpoints))
}
