//! Documentation rendering.
//!
//! # Flow
//!
//! ```text
//! doc sources ─► modified since last run? ─► fresh context ─► RenderEnv
//!                                                               │
//!      markdown filter ─► project globals ─► customizers ─► dependency globals
//!                                                               │
//!                                    render each file ─► <output_dir>/<rel>.html
//! ```
//!
//! A document that fails to render is reported with a bell and skipped;
//! the rest of the batch still renders. The same goes for a broken
//! template: it is reported and left out, and only the documents using it
//! fail.

use crate::config::ProjectConfig;
use crate::data::load_context;
use crate::freshness::modified_since;
use crate::logger::alert;
use crate::registry::Component;
use crate::render::{DeclaredGlobals, MarkdownFilter, RenderEnv, SharedCustomizer};
use crate::utils::path::mirror_path;
use crate::utils::write::write_if_changed;
use crate::{debug, log};
use anyhow::{Context as _, Result, anyhow};
use serde_json::Value;
use std::path::PathBuf;
use std::time::SystemTime;
use tera::Context;

/// What a documentation build needs besides the component itself.
#[derive(Clone, Copy)]
pub struct BuildEnv<'a> {
    pub config: &'a ProjectConfig,
    /// Programmatic customizers, applied after `[env.globals]`.
    pub customizers: &'a [SharedCustomizer],
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Rendered and written.
    pub written: usize,
    /// Rendered, output already up to date.
    pub unchanged: usize,
    /// Not modified since the previous run.
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn rendered(&self) -> usize {
        self.written + self.unchanged
    }
}

/// Render a component's docs.
///
/// With `since`, only sources modified at or after that instant are
/// rendered; without it, every source is.
pub fn build_docs(
    component: &Component,
    since: Option<SystemTime>,
    env: &BuildEnv<'_>,
) -> Result<BuildReport> {
    let docs = component
        .docs
        .as_ref()
        .ok_or_else(|| anyhow!("component `{}` has no docs", component.name))?;

    let mut report = BuildReport::default();
    let files: Vec<_> = docs
        .sources
        .files()
        .into_iter()
        .filter(|file| {
            let stale = modified_since(&file.path, since);
            if !stale {
                report.skipped += 1;
            }
            stale
        })
        .collect();

    if files.is_empty() {
        debug!("build"; "{}: nothing to render", component.name);
        return Ok(report);
    }

    let config = env.config;
    let context = Context::from_value(Value::Object(load_context(config)))
        .context("template data is not an object")?;

    let mut render_env = match RenderEnv::load(&component.import_paths, &config.markup_source_extension) {
        Ok(render_env) => render_env,
        Err(e) => {
            alert("render", &e.describe());
            return Err(e).with_context(|| format!("cannot build docs of `{}`", component.name));
        }
    };
    for skipped in render_env.skipped() {
        alert("render", &skipped.describe());
    }
    customize(&mut render_env, env);

    for file in &files {
        let output = mirror_path(&file.path, &file.base, &docs.output_dir, "html");

        let html = match render_env.render_file(&file.path, &context) {
            Ok(html) => html,
            Err(e) => {
                alert("render", &e.describe());
                report.failed.push(file.path.clone());
                continue;
            }
        };

        match write_if_changed(&output, html.as_bytes()) {
            Ok(true) => {
                debug!("build"; "{}", config.root_relative(&output).display());
                report.written += 1;
            }
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                log!("error"; "failed to write {}: {}", output.display(), e);
                report.failed.push(file.path.clone());
            }
        }
    }

    Ok(report)
}

/// Apply customizers in order: markdown filter, `[env.globals]`,
/// programmatic customizers, then each dependency module's globals.
fn customize(render_env: &mut RenderEnv, env: &BuildEnv<'_>) {
    let config = env.config;

    render_env.customize(&MarkdownFilter::new(
        config.include_markdown_wrapper,
        config.markdown_wrapper_class.clone(),
    ));
    render_env.customize(&DeclaredGlobals::new(&config.env));

    for customizer in env.customizers {
        render_env.customize(customizer.as_ref());
    }

    for dependency in &config.dependencies {
        if let Some(dep_env) = dependency.load_env(config.get_root(), &config.dependencies_path) {
            render_env.customize(&DeclaredGlobals::new(&dep_env));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::registry::Registry;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[[components]]
name = "site"
import_paths = ["templates"]
docs = { sources = ["docs/**/*.njk"], output_path = "_site" }
"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn build(root: &Path, content: &str, since: Option<SystemTime>) -> (BuildReport, ProjectConfig) {
        let config = test_config_at(root, content);
        let registry = Registry::new(&config).unwrap();
        let env = BuildEnv {
            config: &config,
            customizers: &[],
        };
        let report = build_docs(registry.get("site").unwrap(), since, &env).unwrap();
        (report, config)
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    #[test]
    fn test_renders_mirrored_html_with_data() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"version": "2.1.0"}"#);
        write(dir.path(), "data/site.json", r#"{"title": "Guide"}"#);
        write(dir.path(), "templates/layout.njk", "<h1>{{ site.title }}</h1>{% block body %}{% endblock body %}");
        write(
            dir.path(),
            "docs/index.njk",
            r#"{% extends "layout.njk" %}{% block body %}v{{ package.version }}{% endblock body %}"#,
        );
        write(dir.path(), "docs/guide/intro.njk", "{{ \"# Intro\" | markdown(wrap=false) }}");

        let (report, _) = build(dir.path(), CONFIG, None);
        assert_eq!(report.written, 2);
        assert!(report.is_clean());
        assert_eq!(read(dir.path(), "_site/index.html"), "<h1>Guide</h1>v2.1.0");
        assert_eq!(read(dir.path(), "_site/guide/intro.html"), "<h1>Intro</h1>\n");
    }

    #[test]
    fn test_render_error_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/a.njk", "{{ undefined_variable }}");
        write(dir.path(), "docs/b.njk", "ok");

        let (report, _) = build(dir.path(), CONFIG, None);
        assert_eq!(report.written, 1);
        assert_eq!(report.failed, vec![dir.path().canonicalize().unwrap().join("docs/a.njk")]);
        assert_eq!(read(dir.path(), "_site/b.html"), "ok");
        assert!(!dir.path().join("_site/a.html").exists());
    }

    #[test]
    fn test_unused_broken_template_does_not_stop_build() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "templates/unused_broken.njk", "{% if %}");
        write(dir.path(), "templates/card.njk", "[card]");
        write(dir.path(), "docs/a.njk", "a");
        write(dir.path(), "docs/b.njk", "{% include \"card.njk\" %}");
        write(dir.path(), "docs/c.njk", "{% include \"unused_broken.njk\" %}");

        let (report, _) = build(dir.path(), CONFIG, None);
        assert_eq!(report.written, 2);
        assert_eq!(read(dir.path(), "_site/a.html"), "a");
        assert_eq!(read(dir.path(), "_site/b.html"), "[card]");
        assert_eq!(report.failed, vec![dir.path().canonicalize().unwrap().join("docs/c.njk")]);
    }

    #[test]
    fn test_since_skips_older_sources() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/a.njk", "a");

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (report, _) = build(dir.path(), CONFIG, Some(later));
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rendered(), 0);
        assert!(!dir.path().join("_site/a.html").exists());
    }

    #[test]
    fn test_unchanged_output_counted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/a.njk", "a");
        build(dir.path(), CONFIG, None);

        let (report, _) = build(dir.path(), CONFIG, None);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.written, 0);
    }

    #[test]
    fn test_no_sources_is_empty_report() {
        let dir = TempDir::new().unwrap();
        let (report, _) = build(dir.path(), CONFIG, None);
        assert_eq!(report, BuildReport::default());
    }

    #[test]
    fn test_customizer_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/a.njk", "{{ brand() }}/{{ site_name() }}");
        write(
            dir.path(),
            "node_modules/product-a/docsmith.toml",
            "[env.globals]\nbrand = \"module\"\n",
        );

        let content = format!(
            "{CONFIG}\n[env.globals]\nbrand = \"project\"\nsite_name = \"Docs\"\n\n[[dependencies]]\nmodule_name = \"product-a\"\n"
        );
        let config = test_config_at(dir.path(), &content);
        let registry = Registry::new(&config).unwrap();

        let programmatic: SharedCustomizer = Arc::new(|tera: &mut tera::Tera| {
            tera.register_function("site_name", |_: &HashMap<String, Value>| -> tera::Result<Value> {
                Ok(Value::String("Programmatic".into()))
            });
        });
        let customizers = vec![programmatic];
        let env = BuildEnv {
            config: &config,
            customizers: &customizers,
        };

        build_docs(registry.get("site").unwrap(), None, &env).unwrap();
        assert_eq!(read(dir.path(), "_site/a.html"), "module/Programmatic");
    }

    #[test]
    fn test_component_without_docs_errors() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[[components]]\nname = \"lib\"\n");
        let registry = Registry::new(&config).unwrap();
        let env = BuildEnv {
            config: &config,
            customizers: &[],
        };
        assert!(build_docs(registry.get("lib").unwrap(), None, &env).is_err());
    }
}
