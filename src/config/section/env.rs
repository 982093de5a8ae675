//! Render environment customizations and external dependency modules.
//!
//! A project declares `[env.globals]`; each dependency module may ship its
//! own `docsmith.toml` with an `[env]` table that is applied after the
//! project's, in dependency declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of a dependency module's own manifest.
pub const DEPENDENCY_MANIFEST: &str = "docsmith.toml";

/// `[env]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Values exposed to templates as zero-argument functions: `{{ site_name() }}`.
    pub globals: BTreeMap<String, serde_json::Value>,
}

impl EnvConfig {
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

/// `[[dependencies]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Directory name under `dependencies_path`.
    pub module_name: String,
}

impl DependencyConfig {
    /// `<root>/<dependencies_path>/<module_name>`
    pub fn module_dir(&self, root: &Path, dependencies_path: &Path) -> PathBuf {
        root.join(dependencies_path).join(&self.module_name)
    }

    /// The module's token file, assumed at `<module>/<tokens_path>/tokens.json`.
    pub fn tokens_file(&self, root: &Path, dependencies_path: &Path, tokens_path: &Path) -> PathBuf {
        self.module_dir(root, dependencies_path)
            .join(tokens_path)
            .join("tokens.json")
    }

    /// Load the module's `[env]` section.
    ///
    /// A module without a manifest contributes nothing. An unreadable or
    /// malformed manifest is reported and skipped.
    pub fn load_env(&self, root: &Path, dependencies_path: &Path) -> Option<EnvConfig> {
        #[derive(Deserialize)]
        struct Manifest {
            #[serde(default)]
            env: EnvConfig,
        }

        let path = self
            .module_dir(root, dependencies_path)
            .join(DEPENDENCY_MANIFEST);
        if !path.is_file() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                crate::log!("warning"; "could not read {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str::<Manifest>(&content) {
            Ok(manifest) if !manifest.env.is_empty() => Some(manifest.env),
            Ok(_) => None,
            Err(e) => {
                crate::log!("warning"; "could not parse {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dependency(name: &str) -> DependencyConfig {
        DependencyConfig {
            module_name: name.into(),
        }
    }

    #[test]
    fn test_tokens_file_location() {
        let dep = dependency("product-a");
        let path = dep.tokens_file(Path::new("/site"), Path::new("node_modules"), Path::new("tokens"));
        assert_eq!(path, PathBuf::from("/site/node_modules/product-a/tokens/tokens.json"));
    }

    #[test]
    fn test_load_env_missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(dependency("absent").load_env(dir.path(), Path::new("deps")).is_none());
    }

    #[test]
    fn test_load_env_reads_globals() {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("deps/product-a");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(
            module.join(DEPENDENCY_MANIFEST),
            "[env.globals]\nbrand = \"Product A\"\n",
        )
        .unwrap();

        let env = dependency("product-a")
            .load_env(dir.path(), Path::new("deps"))
            .unwrap();
        assert_eq!(env.globals["brand"], serde_json::json!("Product A"));
    }

    #[test]
    fn test_load_env_malformed_manifest_skipped() {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("deps/broken");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join(DEPENDENCY_MANIFEST), "[env.globals\n").unwrap();

        assert!(dependency("broken").load_env(dir.path(), Path::new("deps")).is_none());
    }
}
