//! OpenAPI document rendering.
//!
//! The document is deliberately minimal: an info block, a placeholder server,
//! and one operation per endpoint carrying its summary, its handler name as
//! `operationId`, and a single `200` response. No parameters, request bodies
//! or schemas are modeled. The output contains no timestamp, so rendering the
//! same request twice yields identical bytes.

use serde::Serialize;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::endpoint::GenerationRequest;
use crate::error::{Error, Result};

/// OpenAPI version marker written into every document
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Server URL placeholder; consumers substitute their own base URL
pub const SERVER_URL_PLACEHOLDER: &str = "{{baseUrl}}";

#[derive(Serialize)]
struct Document<'a> {
    openapi: &'static str,
    info: Info<'a>,
    servers: Vec<Server>,
    paths: Mapping,
}

#[derive(Serialize)]
struct Info<'a> {
    title: &'a str,
    version: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct Server {
    url: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Operation<'a> {
    summary: &'a str,
    operation_id: &'a str,
    responses: Responses,
}

#[derive(Serialize)]
struct Responses {
    #[serde(rename = "200")]
    ok: Response,
}

#[derive(Serialize)]
struct Response {
    description: &'static str,
}

/// Render the OpenAPI document for a request as YAML.
///
/// Endpoints are grouped by path, then by lowercase method. Paths keep the
/// order in which they first appear; a repeated method on the same path
/// replaces the earlier operation.
pub fn render_openapi(request: &GenerationRequest) -> Result<String> {
    let descriptor = request.descriptor();

    let mut paths = Mapping::new();
    for endpoint in request.endpoints() {
        let operation = Operation {
            summary: endpoint.summary(),
            operation_id: endpoint.function_name(),
            responses: Responses {
                ok: Response {
                    description: "Success",
                },
            },
        };
        let path_key = YamlValue::String(endpoint.path().to_string());
        if !paths.contains_key(&path_key) {
            paths.insert(path_key.clone(), YamlValue::Mapping(Mapping::new()));
        }
        if let Some(YamlValue::Mapping(item)) = paths.get_mut(&path_key) {
            item.insert(
                YamlValue::String(endpoint.method().as_lower().to_string()),
                serde_yaml::to_value(&operation)?,
            );
        }
    }

    let document = Document {
        openapi: OPENAPI_VERSION,
        info: Info {
            title: &descriptor.name,
            version: &descriptor.version,
            description: &descriptor.description,
        },
        servers: vec![Server {
            url: SERVER_URL_PLACEHOLDER,
        }],
        paths,
    };

    let yaml = serde_yaml::to_string(&document)?;
    validate(&yaml, request)?;
    Ok(yaml)
}

/// Parse the rendered text back as OpenAPI and check every path survived.
fn validate(yaml: &str, request: &GenerationRequest) -> Result<()> {
    let parsed: openapiv3::OpenAPI = serde_yaml::from_str(yaml)
        .map_err(|e| Error::render(format!("rendered OpenAPI document does not parse: {}", e)))?;
    for endpoint in request.endpoints() {
        if !parsed.paths.paths.contains_key(endpoint.path()) {
            return Err(Error::render(format!(
                "path {} is missing from the rendered OpenAPI document",
                endpoint.path()
            )));
        }
    }
    Ok(())
}
