//! The `markdown` template filter.
//!
//! ```text
//! {{ body | markdown }}
//! {{ body | markdown(wrap=false) }}
//! {{ body | markdown(class="prose") }}
//! ```

use super::EnvCustomizer;
use pulldown_cmark::{Options, Parser, html};
use std::collections::HashMap;
use tera::{Filter, Tera, Value};

/// Name the filter is registered under.
pub const MARKDOWN_FILTER: &str = "markdown";

/// Markdown to HTML conversion with an optional wrapper `<div>`.
///
/// Arguments given at the call site win over the configured defaults.
#[derive(Debug, Clone)]
pub struct MarkdownFilter {
    pub include_wrapper: bool,
    pub wrapper_class: String,
}

impl MarkdownFilter {
    pub fn new(include_wrapper: bool, wrapper_class: impl Into<String>) -> Self {
        Self {
            include_wrapper,
            wrapper_class: wrapper_class.into(),
        }
    }
}

impl Filter for MarkdownFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let source = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("markdown filter expects a string"))?;

        let wrap = match args.get("wrap") {
            Some(v) => v
                .as_bool()
                .ok_or_else(|| tera::Error::msg("markdown filter: `wrap` must be a boolean"))?,
            None => self.include_wrapper,
        };
        let class = match args.get("class") {
            Some(v) => v
                .as_str()
                .ok_or_else(|| tera::Error::msg("markdown filter: `class` must be a string"))?,
            None => self.wrapper_class.as_str(),
        };

        let rendered = render_markdown(&strip_indent(source));
        let output = if wrap {
            format!("<div class=\"{class}\">{rendered}</div>")
        } else {
            rendered
        };

        Ok(Value::String(output))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl EnvCustomizer for MarkdownFilter {
    fn customize(&self, tera: &mut Tera) {
        tera.register_filter(MARKDOWN_FILTER, self.clone());
    }
}

/// Convert markdown to HTML with tables, footnotes, strikethrough and task lists.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Remove the indentation shared by every non-blank line.
///
/// Markdown embedded in an indented template block would otherwise turn
/// into a code block.
pub fn strip_indent(source: &str) -> String {
    let indent = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return source.to_string();
    }

    source
        .lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(filter: &MarkdownFilter, input: &str, args: &[(&str, Value)]) -> String {
        let args: HashMap<String, Value> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        filter
            .filter(&json!(input), &args)
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_strip_indent() {
        let input = "    # Title\n\n      nested\n    body";
        assert_eq!(strip_indent(input), "# Title\n\n  nested\nbody");
    }

    #[test]
    fn test_strip_indent_no_common_indent() {
        let input = "# Title\n    code";
        assert_eq!(strip_indent(input), input);
    }

    #[test]
    fn test_wraps_with_configured_class() {
        let filter = MarkdownFilter::new(true, "markdown");
        let out = apply(&filter, "    **bold**", &[]);
        assert_eq!(
            out,
            "<div class=\"markdown\"><p><strong>bold</strong></p>\n</div>"
        );
    }

    #[test]
    fn test_explicit_args_override_defaults() {
        let filter = MarkdownFilter::new(true, "markdown");
        assert_eq!(
            apply(&filter, "hi", &[("wrap", json!(false))]),
            "<p>hi</p>\n"
        );
        assert_eq!(
            apply(&filter, "hi", &[("class", json!("prose"))]),
            "<div class=\"prose\"><p>hi</p>\n</div>"
        );

        let unwrapped = MarkdownFilter::new(false, "markdown");
        assert_eq!(apply(&unwrapped, "hi", &[]), "<p>hi</p>\n");
        assert_eq!(
            apply(&unwrapped, "hi", &[("wrap", json!(true))]),
            "<div class=\"markdown\"><p>hi</p>\n</div>"
        );
    }

    #[test]
    fn test_tables_enabled() {
        let out = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table>"));
    }

    #[test]
    fn test_rejects_non_string() {
        let filter = MarkdownFilter::new(true, "markdown");
        assert!(filter.filter(&json!(42), &HashMap::new()).is_err());
    }

    #[test]
    fn test_output_not_escaped_in_template() {
        let mut tera = Tera::default();
        MarkdownFilter::new(false, "markdown").customize(&mut tera);
        let mut context = tera::Context::new();
        context.insert("body", "*hi*");
        tera.add_raw_template("page.html", "{{ body | markdown }}")
            .unwrap();
        assert_eq!(tera.render("page.html", &context).unwrap(), "<p><em>hi</em></p>\n");
    }
}
