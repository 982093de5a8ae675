//! Operation name prefixes (`[prefixes]`).
//!
//! Operation names are built by plain concatenation, so prefixes carry their
//! own trailing separator: `markup:build:` + `site` = `markup:build:site`.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPrefixes {
    pub concatenate_macros: String,
    pub build: String,
    pub watch: String,
    pub watch_macros: String,
    pub watch_docs: String,
    pub watch_templates: String,
}

impl Default for TaskPrefixes {
    fn default() -> Self {
        Self {
            concatenate_macros: "markup:concatenate:macros:".into(),
            build: "markup:build:".into(),
            watch: "watch:markup:".into(),
            watch_macros: "watch:markup:macros:".into(),
            watch_docs: "watch:markup:docs:".into(),
            watch_templates: "watch:markup:templates:".into(),
        }
    }
}

impl TaskPrefixes {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = [
            ("prefixes.concatenate_macros", &self.concatenate_macros),
            ("prefixes.build", &self.build),
            ("prefixes.watch", &self.watch),
            ("prefixes.watch_macros", &self.watch_macros),
            ("prefixes.watch_docs", &self.watch_docs),
            ("prefixes.watch_templates", &self.watch_templates),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                diag.error(FieldPath::new(field), "prefix must not be empty");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_default_prefixes() {
        let config = test_parse_config("");
        assert_eq!(config.prefixes.build, "markup:build:");
        assert_eq!(config.prefixes.watch_macros, "watch:markup:macros:");
    }

    #[test]
    fn test_partial_override() {
        let config = test_parse_config(
            r#"
[prefixes]
build = "docs:build:"
"#,
        );
        assert_eq!(config.prefixes.build, "docs:build:");
        assert_eq!(config.prefixes.watch, "watch:markup:");
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let prefixes = TaskPrefixes {
            watch: String::new(),
            ..TaskPrefixes::default()
        };
        let mut diag = ConfigDiagnostics::new();
        prefixes.validate(&mut diag);
        let errors: Vec<_> = diag.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_str(), "prefixes.watch");
    }
}
