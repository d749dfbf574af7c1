//! Python-specific context builder (FastAPI server, requests client).

use super::{avoid_reserved, ContextBuilder};

/// Python keywords plus names the generated modules define themselves
const RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
    // scaffold names
    "app", "health", "requests", "resp", "fastapi",
];

#[derive(Debug, Clone)]
pub struct PythonContextBuilder;

impl ContextBuilder for PythonContextBuilder {
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
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
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
        params
            .iter()
            .map(|p| format!("{}: str", p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpoint, HttpMethod};

    #[test]
    fn test_string_literal_escapes_quotes_and_newlines() {
        let b = PythonContextBuilder;
        assert_eq!(b.string_literal("List todos"), "\"List todos\"");
        assert_eq!(
            b.string_literal("say \"hi\"\\now\n"),
            "\"say \\\"hi\\\"\\\\now\\n\""
        );
        assert_eq!(b.string_literal("\u{7}"), "\"\\u0007\"");
        assert_eq!(b.string_literal("{x}"), "\"{x}\"");
    }

    #[test]
    fn test_keywords_and_scaffold_names_are_renamed() {
        let b = PythonContextBuilder;
        assert_eq!(b.safe_identifier("import"), "import_");
        assert_eq!(b.safe_identifier("health"), "health_");
        assert_eq!(b.safe_identifier("list_todos"), "list_todos");
    }

    #[test]
    fn test_endpoint_context() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/todos/{id}", "Get \"one\"", None).unwrap();
        let ctx = PythonContextBuilder.build_endpoint(&endpoint).unwrap();
        assert_eq!(ctx.fn_name, "get_todos_by_id");
        assert_eq!(ctx.route_literal, "\"/todos/{id}\"");
        assert_eq!(ctx.handler_params, "id: str");
        assert_eq!(ctx.summary_literal, "\"Get \\\"one\\\"\"");
        assert_eq!(ctx.call_path_literal, "\"/todos/1\"");
    }

    #[test]
    fn test_renamed_path_params_match_route() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/x/{class}", "", None).unwrap();
        let ctx = PythonContextBuilder.build_endpoint(&endpoint).unwrap();
        assert_eq!(ctx.route_literal, "\"/x/{class_}\"");
        assert_eq!(ctx.handler_params, "class_: str");
        assert_eq!(ctx.path, "/x/{class}");
        assert_eq!(ctx.call_path_literal, "\"/x/1\"");

        let both = Endpoint::new(HttpMethod::Get, "/a/{class}/b/{id}", "", None).unwrap();
        let ctx = PythonContextBuilder.build_endpoint(&both).unwrap();
        assert_eq!(ctx.route_literal, "\"/a/{class_}/b/{id}\"");
        assert_eq!(ctx.handler_params, "class_: str, id: str");
    }
}
