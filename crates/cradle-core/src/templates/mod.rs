//! Template system for code generation

pub mod dir;
pub mod kind;
pub mod manager;

pub use dir::TemplateDir;
pub use kind::{TemplateKind, TemplateRole};
pub use manager::{RenderedFile, TemplateManager, TemplateOrigin};

/// A template set compiled into the library
pub(crate) struct BuiltinTemplates {
    pub manifest: &'static str,
    pub sources: &'static [(&'static str, &'static str)],
}

pub(crate) fn builtin(kind: TemplateKind) -> BuiltinTemplates {
    match kind {
        TemplateKind::PythonFastApi => BuiltinTemplates {
            manifest: include_str!("../../templates/python_fastapi/manifest.yaml"),
            sources: &[
                (
                    "main.py.tera",
                    include_str!("../../templates/python_fastapi/main.py.tera"),
                ),
                (
                    "requirements.txt.tera",
                    include_str!("../../templates/python_fastapi/requirements.txt.tera"),
                ),
            ],
        },
        TemplateKind::RustAxum => BuiltinTemplates {
            manifest: include_str!("../../templates/rust_axum/manifest.yaml"),
            sources: &[
                (
                    "Cargo.toml.tera",
                    include_str!("../../templates/rust_axum/Cargo.toml.tera"),
                ),
                (
                    "main.rs.tera",
                    include_str!("../../templates/rust_axum/main.rs.tera"),
                ),
            ],
        },
        TemplateKind::PythonRequests => BuiltinTemplates {
            manifest: include_str!("../../templates/python_requests/manifest.yaml"),
            sources: &[(
                "client_demo.py.tera",
                include_str!("../../templates/python_requests/client_demo.py.tera"),
            )],
        },
        TemplateKind::Curl => BuiltinTemplates {
            manifest: include_str!("../../templates/curl/manifest.yaml"),
            sources: &[(
                "client_demo.sh.tera",
                include_str!("../../templates/curl/client_demo.sh.tera"),
            )],
        },
    }
}
