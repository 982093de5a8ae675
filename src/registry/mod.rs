//! Resolved component registry.
//!
//! Turns `[[components]]` entries into [`Component`]s with compiled source
//! sets and absolute paths, and checks the cross-component rules that need
//! the whole set at once: unique names and valid `referenced_by` targets.

use crate::config::{ComponentConfig, ConfigDiagnostics, ConfigError, FieldPath, ProjectConfig};
use crate::source::SourceSet;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Macro sources and the generated file they concatenate into.
#[derive(Debug, Clone)]
pub struct MacroSources {
    /// Inputs, with `output_file` excluded.
    pub sources: SourceSet,
    pub output_file: PathBuf,
}

/// Documentation sources, their output directory, and their watch set.
#[derive(Debug, Clone)]
pub struct DocSources {
    pub sources: SourceSet,
    pub output_dir: PathBuf,
    pub watch: SourceSet,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub macros: Option<MacroSources>,
    pub docs: Option<DocSources>,
    pub templates: Option<SourceSet>,
    /// Components whose docs consume this component's macros. Not transitive.
    pub referenced_by: Vec<String>,
    /// Absolute template search paths, in priority order.
    pub import_paths: Vec<PathBuf>,
}

impl Component {
    pub fn has_docs(&self) -> bool {
        self.docs.is_some()
    }
}

/// All components of a project, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    components: Vec<Component>,
    index: FxHashMap<String, usize>,
}

impl Registry {
    /// Resolve and validate every component.
    ///
    /// All problems are collected and reported together.
    pub fn new(config: &ProjectConfig) -> Result<Self> {
        let mut diag = ConfigDiagnostics::new();
        let mut components = Vec::with_capacity(config.components.len());
        let mut index = FxHashMap::default();

        for (i, entry) in config.components.iter().enumerate() {
            if entry.name.is_empty() {
                diag.error(FieldPath::component(i, "name"), "must not be empty");
                continue;
            }
            if index.contains_key(&entry.name) {
                diag.error(
                    FieldPath::component(i, "name"),
                    format!("duplicate component name `{}`", entry.name),
                );
                continue;
            }

            if let Some(component) = resolve(config, i, entry, &mut diag) {
                index.insert(entry.name.clone(), components.len());
                components.push(component);
            }
        }

        let registry = Self { components, index };
        registry.check_references(config, &mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Invalid)?;
        Ok(registry)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn check_references(&self, config: &ProjectConfig, diag: &mut ConfigDiagnostics) {
        for (i, entry) in config.components.iter().enumerate() {
            for target in &entry.referenced_by {
                match self.get(target) {
                    None => diag.error(
                        FieldPath::component(i, "referenced_by"),
                        format!("unknown component `{target}`"),
                    ),
                    Some(c) if !c.has_docs() => diag.error_with_hint(
                        FieldPath::component(i, "referenced_by"),
                        format!("component `{target}` has no docs to rebuild"),
                        "only components with a `docs` attribute can reference macros",
                    ),
                    Some(_) => {}
                }
            }
        }
    }
}

fn resolve(
    config: &ProjectConfig,
    index: usize,
    entry: &ComponentConfig,
    diag: &mut ConfigDiagnostics,
) -> Option<Component> {
    let root = config.get_root();
    let mut ok = true;

    let mut compile = |field: &str, patterns: &[String]| -> Option<SourceSet> {
        match SourceSet::new(root, patterns) {
            Ok(set) => Some(set),
            Err(e) => {
                diag.error(FieldPath::component(index, field), e.to_string());
                ok = false;
                None
            }
        }
    };

    let macros = entry.macros().and_then(|m| {
        let filename = m
            .output_filename
            .clone()
            .unwrap_or_else(|| config.default_macro_filename());
        let output_file = config.root_join(&m.output_path).join(filename);
        compile("macros.sources", &m.sources).map(|sources| MacroSources {
            sources: sources.excluding_file(&output_file),
            output_file,
        })
    });

    let docs = entry.docs().and_then(|d| {
        let sources = compile("docs.sources", &d.sources)?;
        let watch = compile("docs.watch_paths", d.watch_patterns())?;
        Some(DocSources {
            sources,
            output_dir: config.root_join(&d.output_path),
            watch,
        })
    });

    let templates = entry
        .templates()
        .and_then(|t| compile("templates.sources", &t.sources));

    if !ok {
        return None;
    }

    let mut referenced_by: Vec<String> = Vec::new();
    for target in &entry.referenced_by {
        if target != &entry.name && !referenced_by.contains(target) {
            referenced_by.push(target.clone());
        }
    }

    Some(Component {
        name: entry.name.clone(),
        macros,
        docs,
        templates,
        referenced_by,
        import_paths: entry
            .import_paths
            .iter()
            .map(|p| config.root_join(p))
            .collect(),
    })
}
