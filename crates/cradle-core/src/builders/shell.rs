//! POSIX shell context builder for the curl client demo.

use super::ContextBuilder;

#[derive(Debug, Clone)]
pub struct ShellContextBuilder;

impl ContextBuilder for ShellContextBuilder {
    /// Single-quoted word; embedded quotes are closed, escaped and reopened
    fn string_literal(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "'\\''"))
    }

    fn safe_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn handler_params(&self, _params: &[&str]) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quote_escaping() {
        let b = ShellContextBuilder;
        assert_eq!(b.string_literal("/todos"), "'/todos'");
        assert_eq!(b.string_literal("it's"), "'it'\\''s'");
        assert_eq!(b.string_literal("$(rm -rf /)"), "'$(rm -rf /)'");
    }
}
