//! Rust-specific context builder for the axum server scaffold.

use super::{avoid_reserved, ContextBuilder};

/// Strict, reserved and weak keywords plus names the scaffold defines
const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "union",
    // scaffold names
    "main", "health", "app", "listener", "json", "get", "post", "put", "patch", "delete",
    // crates the scaffold refers to by path
    "std", "core", "alloc", "axum", "tokio", "serde_json",
];

#[derive(Debug, Clone)]
pub struct RustContextBuilder;

impl ContextBuilder for RustContextBuilder {
    fn string_literal(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for c in text.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }

    fn safe_identifier(&self, name: &str) -> String {
        avoid_reserved(name, RESERVED)
    }

    fn handler_params(&self, params: &[&str]) -> String {
        if params.is_empty() {
            String::new()
        } else {
            "Path(_params): Path<HashMap<String, String>>".to_string()
        }
    }

    /// axum 0.7 routes use `:param` captures
    fn route(&self, path: &str) -> String {
        path.split('/')
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => format!(":{}", param),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpoint, HttpMethod};

    #[test]
    fn test_string_literal() {
        let b = RustContextBuilder;
        assert_eq!(b.string_literal("a \"b\"\n"), "\"a \\\"b\\\"\\n\"");
        assert_eq!(b.string_literal("\u{1b}"), "\"\\u{1b}\"");
    }

    #[test]
    fn test_route_uses_colon_captures() {
        let b = RustContextBuilder;
        assert_eq!(b.route("/users/{user_id}/posts"), "/users/:user_id/posts");
        assert_eq!(b.route("/"), "/");
    }

    #[test]
    fn test_keywords_are_renamed() {
        let b = RustContextBuilder;
        assert_eq!(b.safe_identifier("match"), "match_");
        assert_eq!(b.safe_identifier("main"), "main_");
        for name in ["tokio", "axum", "serde_json", "std"] {
            assert_eq!(b.safe_identifier(name), format!("{}_", name));
        }
        assert_eq!(b.safe_identifier("add"), "add");
    }

    #[test]
    fn test_path_params_use_extractor() {
        let endpoint = Endpoint::new(HttpMethod::Put, "/todos/{id}", "", Some("update_todo")).unwrap();
        let ctx = RustContextBuilder.build_endpoint(&endpoint).unwrap();
        assert_eq!(ctx.route_literal, "\"/todos/:id\"");
        assert!(ctx.handler_params.starts_with("Path("));
        assert_eq!(ctx.summary_literal, "\"\"");
    }
}
