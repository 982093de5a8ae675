//! Project configuration management for `docsmith.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── component  # [[components]]
//! │   ├── env        # [env], [[dependencies]]
//! │   ├── hooks      # [hooks."<operation>"]
//! │   └── prefix     # [prefixes]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The loaded configuration is an explicit value: it is threaded through the
//! registry and the executor rather than read from a global.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_against};

pub use section::{
    ComponentConfig, DependencyConfig, DocSourcesConfig, EnvConfig, HookConfig,
    MacroSourcesConfig, OperationHooks, TaskPrefixes, TemplateSourcesConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, log, utils::path::normalize_path};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "docsmith.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing docsmith.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Resolved absolute project root (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Project root, relative to the config file's directory.
    pub root_path: PathBuf,
    /// Directory of namespaced `*.json` data files.
    pub data_path: PathBuf,
    /// Directory of top-level-merged token `*.json` files.
    pub tokens_path: PathBuf,
    /// Directory containing dependency modules.
    pub dependencies_path: PathBuf,
    /// Dependency modules contributing tokens and env customizations.
    pub dependencies: Vec<DependencyConfig>,

    /// Namespace used for the default concatenated macro file name.
    pub code_namespace: String,
    /// Extension of template sources, including the dot.
    pub markup_source_extension: String,

    /// CSS class of the markdown wrapper `<div>`.
    pub markdown_wrapper_class: String,
    /// Wrap markdown filter output by default.
    pub include_markdown_wrapper: bool,
    /// Global switch for macro concatenation (disabled = no-op success).
    pub concatenate_component_macros: bool,

    /// Target name of aggregate operations (`markup:build:<all_task_name>`).
    pub all_task_name: String,
    pub prefixes: TaskPrefixes,

    /// Project render environment customizations.
    pub env: EnvConfig,

    #[serde(alias = "tasks")]
    pub components: Vec<ComponentConfig>,

    /// Hooks keyed by exact operation name.
    pub hooks: BTreeMap<String, OperationHooks>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            root_path: PathBuf::from("."),
            data_path: PathBuf::from("data"),
            tokens_path: PathBuf::from("tokens"),
            dependencies_path: PathBuf::from("node_modules"),
            dependencies: Vec::new(),
            code_namespace: "docs".into(),
            markup_source_extension: ".njk".into(),
            markdown_wrapper_class: "markdown".into(),
            include_markdown_wrapper: true,
            concatenate_component_macros: true,
            all_task_name: "all".into(),
            prefixes: TaskPrefixes::default(),
            env: EnvConfig::default(),
            components: Vec::new(),
            hooks: BTreeMap::new(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// `root_path` resolved against the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        config.finalize();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve the project root from the config file location.
    fn finalize(&mut self) {
        let config_dir = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let root = resolve_against(&self.root_path, &config_dir);
        self.set_root(&normalize_path(&root));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Concatenated macro file name used when a component does not name one.
    pub fn default_macro_filename(&self) -> String {
        format!("{}{}", self.code_namespace, self.markup_source_extension)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate project-level settings.
    ///
    /// Component-level checks need the whole component set and happen when
    /// the registry is built.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.prefixes.validate(&mut diag);

        if self.all_task_name.is_empty() {
            diag.error(FieldPath::new("all_task_name"), "must not be empty");
        }

        if !self.markup_source_extension.starts_with('.') {
            diag.error_with_hint(
                FieldPath::new("markup_source_extension"),
                format!("`{}` is not an extension", self.markup_source_extension),
                "include the leading dot, e.g. \".njk\"",
            );
        }

        for dep in &self.dependencies {
            if dep.module_name.is_empty() {
                diag.error(FieldPath::new("dependencies"), "module_name must not be empty");
            }
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Invalid(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse config rooted at an existing directory.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> ProjectConfig {
    let mut config = test_parse_config(content);
    let root = normalize_path(root);
    config.config_path = root.join(CONFIG_FILE);
    config.set_root(&root);
    config
}

// ============================================================================
// tests
// ============================================================================
