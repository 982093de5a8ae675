//! Template data aggregation.
//!
//! Every documentation build reads its context fresh from disk:
//!
//! ```text
//! package.json                         → { "package": {...} }
//! <tokens_path>/*.json                 → merged at the top level
//! <deps>/<module>/<tokens_path>/tokens.json → merged at the top level
//! <data_path>/<stem>.json              → { "<stem>": {...} }
//! ```
//!
//! Later sources overwrite earlier keys. A source that cannot be read or
//! parsed is reported and skipped; the rest of the context still loads.

use crate::config::ProjectConfig;
use crate::log;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key holding the project's `package.json`.
pub const PACKAGE_KEY: &str = "package";

/// Resolved locations of every context source, in merge order.
#[derive(Debug, Clone, Default)]
pub struct DataSources {
    pub package: Option<PathBuf>,
    pub tokens: Vec<PathBuf>,
    pub data: Vec<PathBuf>,
}

impl DataSources {
    pub fn from_config(config: &ProjectConfig) -> Self {
        let root = config.get_root();

        let package = Some(root.join("package.json")).filter(|p| p.is_file());

        let mut tokens = json_files(&root.join(&config.tokens_path));
        tokens.extend(
            config
                .dependencies
                .iter()
                .map(|dep| dep.tokens_file(root, &config.dependencies_path, &config.tokens_path))
                .filter(|p| p.is_file()),
        );

        let data = json_files(&root.join(&config.data_path));

        Self {
            package,
            tokens,
            data,
        }
    }

    /// Read and merge all sources.
    pub fn load(&self) -> Map<String, Value> {
        let mut context = Map::new();

        if let Some(path) = &self.package
            && let Some(json) = read_json(path, "package.json")
        {
            context.insert(PACKAGE_KEY.to_string(), json);
        }

        for path in &self.tokens {
            match read_json(path, "tokens") {
                Some(Value::Object(map)) => context.extend(map),
                Some(_) => {
                    log!("warning"; "tokens file {} is not a JSON object, skipping", path.display());
                }
                None => {}
            }
        }

        for path in &self.data {
            let Some(namespace) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(json) = read_json(path, "data") {
                context.insert(namespace.to_string(), json);
            }
        }

        context
    }
}

/// Load the full context for `config`.
pub fn load_context(config: &ProjectConfig) -> Map<String, Value> {
    DataSources::from_config(config).load()
}

/// `*.json` files directly inside `dir`, sorted by file name.
fn json_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn read_json(path: &Path, kind: &str) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log!("warning"; "could not read {} file {}: {}", kind, path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(json) => Some(json),
        Err(e) => {
            log!("warning"; "could not parse {} file {}: {}", kind, path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_empty_project_yields_empty_context() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        assert!(load_context(&config).is_empty());
    }

    #[test]
    fn test_package_json_under_package_key() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"name": "site", "version": "1.2.0"}"#);
        let config = test_config_at(dir.path(), "");

        let context = load_context(&config);
        assert_eq!(context["package"]["version"], json!("1.2.0"));
    }

    #[test]
    fn test_data_files_namespaced_by_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data/colors.json", r##"{"primary": "#0af"}"##);
        write(dir.path(), "data/nav.json", r#"["home", "guide"]"#);
        write(dir.path(), "data/notes.txt", "ignored");
        let config = test_config_at(dir.path(), "");

        let context = load_context(&config);
        assert_eq!(context["colors"]["primary"], json!("#0af"));
        assert_eq!(context["nav"], json!(["home", "guide"]));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_tokens_merged_top_level_dependencies_last() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tokens/a.json", r#"{"color": "red", "size": 1}"#);
        write(dir.path(), "tokens/b.json", r#"{"size": 2}"#);
        write(
            dir.path(),
            "node_modules/product-a/tokens/tokens.json",
            r#"{"color": "blue"}"#,
        );
        let config = test_config_at(
            dir.path(),
            r#"
[[dependencies]]
module_name = "product-a"

[[dependencies]]
module_name = "missing-module"
"#,
        );

        let context = load_context(&config);
        assert_eq!(context["color"], json!("blue"));
        assert_eq!(context["size"], json!(2));
    }

    #[test]
    fn test_data_namespace_overwrites_token_key() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tokens/t.json", r#"{"colors": "from-tokens"}"#);
        write(dir.path(), "data/colors.json", r#"{"primary": "green"}"#);
        let config = test_config_at(dir.path(), "");

        let context = load_context(&config);
        assert_eq!(context["colors"], json!({"primary": "green"}));
    }

    #[test]
    fn test_malformed_source_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{ not json");
        write(dir.path(), "tokens/bad.json", "{");
        write(dir.path(), "tokens/list.json", "[1, 2]");
        write(dir.path(), "tokens/good.json", r#"{"ok": true}"#);
        write(dir.path(), "data/broken.json", "nope");
        write(dir.path(), "data/fine.json", "42");
        let config = test_config_at(dir.path(), "");

        let context = load_context(&config);
        assert!(!context.contains_key("package"));
        assert!(!context.contains_key("broken"));
        assert_eq!(context["ok"], json!(true));
        assert_eq!(context["fine"], json!(42));
    }

    #[test]
    fn test_sources_reflect_disk_changes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data/site.json", r#"{"title": "One"}"#);
        let config = test_config_at(dir.path(), "");
        assert_eq!(load_context(&config)["site"]["title"], json!("One"));

        write(dir.path(), "data/site.json", r#"{"title": "Two"}"#);
        assert_eq!(load_context(&config)["site"]["title"], json!("Two"));
    }
}
