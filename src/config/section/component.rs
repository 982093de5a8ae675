//! Component declarations (`[[components]]`).
//!
//! # Example
//!
//! ```toml
//! [[components]]
//! name = "buttons"
//! referenced_by = ["site"]
//! import_paths = ["components"]
//! macros = { sources = ["components/**/*.njk"], output_path = "components" }
//! docs = { sources = "docs/**/*.njk", output_path = "_site/buttons" }
//! templates = { sources = ["templates/**/*.njk"] }
//! ```
//!
//! Every attribute is optional. A missing attribute (or one with no source
//! patterns) simply yields fewer operations.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// A single `[[components]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Unique name, used in every derived operation name.
    pub name: String,
    /// Macro sources concatenated into one importable file.
    pub macros: Option<MacroSourcesConfig>,
    /// Documentation templates rendered to HTML.
    pub docs: Option<DocSourcesConfig>,
    /// Layout/include templates, never rendered on their own.
    pub templates: Option<TemplateSourcesConfig>,
    /// Components whose docs consume this component's macros.
    pub referenced_by: Vec<String>,
    /// Template search paths for imports and includes.
    pub import_paths: Vec<PathBuf>,
}

impl ComponentConfig {
    /// Macro attribute, if present with at least one pattern.
    pub fn macros(&self) -> Option<&MacroSourcesConfig> {
        self.macros.as_ref().filter(|m| !m.sources.is_empty())
    }

    /// Docs attribute, if present with at least one pattern.
    pub fn docs(&self) -> Option<&DocSourcesConfig> {
        self.docs.as_ref().filter(|d| !d.sources.is_empty())
    }

    /// Templates attribute, if present with at least one pattern.
    pub fn templates(&self) -> Option<&TemplateSourcesConfig> {
        self.templates.as_ref().filter(|t| !t.sources.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroSourcesConfig {
    #[serde(default, deserialize_with = "one_or_many")]
    pub sources: Vec<String>,
    /// Directory receiving the concatenated file.
    pub output_path: PathBuf,
    /// Concatenated file name. Defaults to `<code_namespace><markup_source_extension>`.
    #[serde(default)]
    pub output_filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocSourcesConfig {
    #[serde(default, deserialize_with = "one_or_many")]
    pub sources: Vec<String>,
    /// Directory receiving rendered HTML.
    pub output_path: PathBuf,
    /// Patterns whose change triggers an incremental rebuild (defaults to `sources`).
    #[serde(default, deserialize_with = "one_or_many")]
    pub watch_paths: Vec<String>,
}

impl DocSourcesConfig {
    pub fn watch_patterns(&self) -> &[String] {
        if self.watch_paths.is_empty() {
            &self.sources
        } else {
            &self.watch_paths
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSourcesConfig {
    #[serde(default, deserialize_with = "one_or_many")]
    pub sources: Vec<String>,
}

/// Accept either `"pattern"` or `["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}
