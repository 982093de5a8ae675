//! Glob-based source sets.
//!
//! A [`SourceSet`] is the file-selection half of every component attribute:
//! it lists the files an operation reads, and it decides whether a changed
//! path should wake a watch.
//!
//! Patterns are relative to the project root. A leading `!` turns a pattern
//! into an exclusion. Each include pattern has a *base*: its leading literal
//! directories (`docs/**/*.njk` → `docs`), used as the walk root and as the
//! anchor for mirrored output paths.

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use crate::log;
use jwalk::{Parallelism, WalkDir};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid glob `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("absolute glob `{0}` is not supported")]
    Absolute(String),
}

/// A file selected by a source set, with the base of the pattern that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub base: PathBuf,
}

#[derive(Debug, Clone)]
struct Include {
    pattern: String,
    base: PathBuf,
    matcher: GlobMatcher,
}

/// Include/exclude globs anchored at a project root.
#[derive(Debug, Clone)]
pub struct SourceSet {
    root: PathBuf,
    includes: Vec<Include>,
    exclude_patterns: Vec<String>,
    excludes: GlobSet,
    /// Exact root-relative paths excluded (generated files).
    exclude_files: Vec<PathBuf>,
}

impl SourceSet {
    /// Compile `patterns` relative to `root`.
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self, SourceError> {
        let mut includes = Vec::new();
        let mut exclude_patterns = Vec::new();

        for raw in patterns {
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

            if Path::new(pattern).is_absolute() {
                return Err(SourceError::Absolute(raw.clone()));
            }

            if negated {
                exclude_patterns.push(pattern.to_string());
            } else {
                includes.push(Include {
                    pattern: pattern.to_string(),
                    base: glob_base(pattern),
                    matcher: compile(pattern)?.compile_matcher(),
                });
            }
        }

        let excludes = build_set(&exclude_patterns)?;

        Ok(Self {
            root: root.to_path_buf(),
            includes,
            exclude_patterns,
            excludes,
            exclude_files: Vec::new(),
        })
    }

    /// Exclude one exact file (absolute or root-relative).
    pub fn excluding_file(mut self, path: &Path) -> Self {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude_files.push(relative.to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    /// Include patterns followed by `!`-prefixed exclusions.
    pub fn patterns(&self) -> Vec<String> {
        self.includes
            .iter()
            .map(|i| i.pattern.clone())
            .chain(self.exclude_patterns.iter().map(|p| format!("!{p}")))
            .chain(
                self.exclude_files
                    .iter()
                    .map(|p| format!("!{}", p.display())),
            )
            .collect()
    }

    /// Whether `path` (absolute, or relative to the root) is selected.
    pub fn matches(&self, path: &Path) -> bool {
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => return false,
            }
        } else {
            path
        };

        self.includes.iter().any(|i| i.matcher.is_match(relative)) && !self.is_excluded(relative)
    }

    /// All existing files selected by the set, sorted by path.
    ///
    /// A pattern whose base directory does not exist selects nothing.
    pub fn files(&self) -> Vec<SourceFile> {
        let mut seen = FxHashSet::default();
        let mut files = Vec::new();

        for include in &self.includes {
            let dir = self.root.join(&include.base);
            if !dir.is_dir() {
                continue;
            }

            // Serial: `files()` runs inside rayon workers when operations fan out
            for entry in WalkDir::new(&dir).sort(true).parallelism(Parallelism::Serial) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log!("warning"; "cannot read under {}: {}", dir.display(), e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                if !include.matcher.is_match(relative) || self.is_excluded(relative) {
                    continue;
                }
                if seen.insert(path.clone()) {
                    files.push(SourceFile {
                        path,
                        base: dir.clone(),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Directories a watcher must observe to see every selected file.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for include in &self.includes {
            let dir = self.root.join(&include.base);
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
        roots
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.excludes.is_match(relative) || self.exclude_files.iter().any(|f| f == relative)
    }
}

fn compile(pattern: &str) -> Result<globset::Glob, SourceError> {
    // `*` stays within one directory, only `**` crosses separators
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| SourceError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

fn build_set(patterns: &[String]) -> Result<GlobSet, SourceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile(pattern)?);
    }
    builder.build().map_err(|source| SourceError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

fn is_glob(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

/// Leading literal directories of a pattern.
///
/// A fully literal pattern names a file, so its base is the parent directory.
fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for (i, part) in parts.iter().enumerate() {
        if is_glob(part) || i + 1 == parts.len() {
            break;
        }
        base.push(part);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("docs/**/*.njk"), PathBuf::from("docs"));
        assert_eq!(glob_base("docs/index.njk"), PathBuf::from("docs"));
        assert_eq!(glob_base("a/b/*.njk"), PathBuf::from("a/b"));
        assert_eq!(glob_base("*.njk"), PathBuf::new());
        assert_eq!(glob_base("components/{button,card}/*.njk"), PathBuf::from("components"));
    }

    #[test]
    fn test_matches_relative_and_absolute() {
        let set = SourceSet::new(Path::new("/site"), &patterns(&["docs/**/*.njk"])).unwrap();
        assert!(set.matches(Path::new("/site/docs/index.njk")));
        assert!(set.matches(Path::new("/site/docs/guide/intro.njk")));
        assert!(set.matches(Path::new("docs/index.njk")));
        assert!(!set.matches(Path::new("/site/docs/index.html")));
        assert!(!set.matches(Path::new("/other/docs/index.njk")));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let set = SourceSet::new(Path::new("/site"), &patterns(&["docs/*.njk"])).unwrap();
        assert!(set.matches(Path::new("docs/index.njk")));
        assert!(!set.matches(Path::new("docs/guide/intro.njk")));
    }

    #[test]
    fn test_negated_pattern_excludes() {
        let set = SourceSet::new(
            Path::new("/site"),
            &patterns(&["components/**/*.njk", "!components/**/_*.njk"]),
        )
        .unwrap();
        assert!(set.matches(Path::new("components/button/button.njk")));
        assert!(!set.matches(Path::new("components/button/_draft.njk")));
    }

    #[test]
    fn test_excluding_file() {
        let set = SourceSet::new(Path::new("/site"), &patterns(&["components/**/*.njk"]))
            .unwrap()
            .excluding_file(Path::new("/site/components/uds.njk"));
        assert!(!set.matches(Path::new("/site/components/uds.njk")));
        assert!(set.matches(Path::new("/site/components/button/button.njk")));
        assert!(set.patterns().contains(&"!components/uds.njk".to_string()));
    }

    #[test]
    fn test_absolute_pattern_rejected() {
        let err = SourceSet::new(Path::new("/site"), &patterns(&["/etc/*.njk"])).unwrap_err();
        assert!(matches!(err, SourceError::Absolute(_)));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let err = SourceSet::new(Path::new("/site"), &patterns(&["docs/[.njk"])).unwrap_err();
        assert!(matches!(err, SourceError::Glob { .. }));
    }

    #[test]
    fn test_files_sorted_deduped_with_base() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "docs/b.njk");
        touch(root, "docs/a.njk");
        touch(root, "docs/guide/c.njk");
        touch(root, "docs/readme.md");

        let set = SourceSet::new(root, &patterns(&["docs/**/*.njk", "docs/a.njk"])).unwrap();
        let files = set.files();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("docs/a.njk"),
                PathBuf::from("docs/b.njk"),
                PathBuf::from("docs/guide/c.njk"),
            ]
        );
        assert!(files.iter().all(|f| f.base == root.join("docs")));
    }

    #[test]
    fn test_files_inside_rayon_workers() {
        use rayon::prelude::*;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let sets: Vec<SourceSet> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| {
                touch(root, &format!("{name}/index.njk"));
                touch(root, &format!("{name}/guide/intro.njk"));
                SourceSet::new(root, &patterns(&[&format!("{name}/**/*.njk")])).unwrap()
            })
            .collect();

        let counts: Vec<usize> = sets.par_iter().map(|set| set.files().len()).collect();
        assert_eq!(counts, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_files_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = SourceSet::new(dir.path(), &patterns(&["nowhere/**/*.njk"])).unwrap();
        assert!(set.files().is_empty());
    }

    #[test]
    fn test_watch_roots_deduped() {
        let set = SourceSet::new(
            Path::new("/site"),
            &patterns(&["docs/**/*.njk", "docs/*.md", "templates/*.njk"]),
        )
        .unwrap();
        assert_eq!(
            set.watch_roots(),
            vec![PathBuf::from("/site/docs"), PathBuf::from("/site/templates")]
        );
    }
}
