//! Cradle Core Library
//!
//! This library turns an API requirement into a small generated project: an
//! OpenAPI document, a server scaffold and a client demo, all derived from
//! one validated endpoint list. The requirement is either a key of the
//! built-in demo catalog or free text answered by a generation provider.

pub mod artifacts;
pub mod builders;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod manifest;
pub mod providers;
pub mod render;
pub mod session;
pub mod source;
pub mod templates;
pub mod utils;

pub use crate::{
    artifacts::{archive_file_name, project_dir_name, ArtifactSet},
    config::Config,
    endpoint::{ApiDescriptor, Endpoint, GenerationRequest, HttpMethod},
    error::{Error, Result},
    render::{render_openapi, RenderSettings, Renderer},
    session::{GenerationOutcome, Phase, Selection, Session, SimulatedResponse},
    source::{EndpointSource, SourceMode, SourceOrigin},
    templates::{TemplateKind, TemplateManager},
};
