//! Template rendering.
//!
//! A [`RenderEnv`] is built fresh for every documentation build from a
//! component's import paths, then customized (markdown filter, project and
//! dependency customizers) before any document is rendered.

mod env;
mod markdown;

pub use env::{DeclaredGlobals, EnvCustomizer, SharedCustomizer};
pub use markdown::{MARKDOWN_FILTER, MarkdownFilter, render_markdown, strip_indent};

use crate::log;
use jwalk::{Parallelism, WalkDir};
use rustc_hash::FxHashSet;
use std::error::Error as _;
use std::path::{Path, PathBuf};
use tera::{Context, Template, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to load templates")]
    Load(#[source] tera::Error),

    #[error("skipped template `{name}`")]
    Parse {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("skipped template `{name}`: it needs `{missing}`, which is not loaded")]
    Unresolved { name: String, missing: String },

    #[error("failed to render `{path}`")]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

impl RenderError {
    /// The error followed by every underlying cause, one per line.
    ///
    /// Tera keeps the useful part (line, variable name) in nested sources.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str("\n  ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Templates available to documents through `import`, `include` and `extends`.
pub struct RenderEnv {
    tera: Tera,
    skipped: Vec<RenderError>,
}

impl RenderEnv {
    /// Load every template under `import_paths`.
    ///
    /// Files with `extension` (e.g. `.njk`) or `.html` are registered by
    /// their path relative to the import path. When two import paths hold
    /// the same name, the first one wins.
    ///
    /// A template that does not parse, or that extends or imports one that
    /// is not loaded, is left out and listed in [`skipped`](Self::skipped).
    /// Only documents using it fail.
    pub fn load(import_paths: &[PathBuf], extension: &str) -> Result<Self, RenderError> {
        let mut seen = FxHashSet::default();
        let mut parsed = Vec::new();
        let mut skipped = Vec::new();

        for import_path in import_paths {
            for (name, path) in template_files(import_path, extension) {
                if !seen.insert(name.clone()) {
                    continue;
                }
                let content =
                    std::fs::read_to_string(&path).map_err(|e| RenderError::Io(path, e))?;
                match Template::new(&name, None, &content) {
                    Ok(template) => parsed.push((template, content)),
                    Err(source) => skipped.push(RenderError::Parse { name, source }),
                }
            }
        }

        // Drop templates whose parent or macro file is gone, until none are left
        loop {
            let loaded: FxHashSet<&str> = parsed.iter().map(|(t, _)| t.name.as_str()).collect();
            let broken: Vec<(usize, String)> = parsed
                .iter()
                .enumerate()
                .filter_map(|(i, (template, _))| {
                    template
                        .parent
                        .iter()
                        .chain(template.imported_macro_files.iter().map(|(file, _)| file))
                        .find(|dep| !loaded.contains(dep.as_str()))
                        .map(|missing| (i, missing.clone()))
                })
                .collect();
            if broken.is_empty() {
                break;
            }
            for (i, missing) in broken.into_iter().rev() {
                let (template, _) = parsed.remove(i);
                skipped.push(RenderError::Unresolved {
                    name: template.name,
                    missing,
                });
            }
        }

        let mut tera = Tera::default();
        // Documents and partials are authored markup
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(
            parsed
                .into_iter()
                .map(|(template, content)| (template.name, content)),
        )
        .map_err(RenderError::Load)?;

        Ok(Self { tera, skipped })
    }

    /// Templates left out by [`load`](Self::load).
    pub fn skipped(&self) -> &[RenderError] {
        &self.skipped
    }

    pub fn customize(&mut self, customizer: &dyn EnvCustomizer) {
        customizer.customize(&mut self.tera);
    }

    /// Render one document source.
    pub fn render(
        &mut self,
        path: &Path,
        source: &str,
        context: &Context,
    ) -> Result<String, RenderError> {
        self.tera
            .render_str(source, context)
            .map_err(|source| RenderError::Render {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read and render a document file.
    pub fn render_file(&mut self, path: &Path, context: &Context) -> Result<String, RenderError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| RenderError::Io(path.to_path_buf(), e))?;
        self.render(path, &source, context)
    }
}

/// `(name, path)` of template files under `dir`, sorted by name.
fn template_files(dir: &Path, extension: &str) -> Vec<(String, PathBuf)> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let extension = extension.trim_start_matches('.');
    let mut files: Vec<(String, PathBuf)> = WalkDir::new(dir)
        .parallelism(Parallelism::Serial)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log!("warning"; "cannot read under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == extension || ext == "html")
        })
        .filter_map(|p| {
            let name = p
                .strip_prefix(dir)
                .ok()?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some((name, p))
        })
        .collect();
    files.sort();
    files
}
