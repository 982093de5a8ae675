//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `mirror_path` - map a source file into an output tree

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Map `source` (located under `base`) into `output_dir`, replacing its extension.
///
/// `docs/guide/intro.njk` with base `docs` lands at `<output_dir>/guide/intro.<ext>`.
/// A source outside `base` keeps only its file name.
pub fn mirror_path(source: &Path, base: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let relative = source
        .strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
    output_dir.join(relative).with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_mirror_path_nested() {
        let out = mirror_path(
            Path::new("/site/docs/guide/intro.njk"),
            Path::new("/site/docs"),
            Path::new("/site/_site/latest"),
            "html",
        );
        assert_eq!(out, PathBuf::from("/site/_site/latest/guide/intro.html"));
    }

    #[test]
    fn test_mirror_path_outside_base() {
        let out = mirror_path(
            Path::new("/elsewhere/page.njk"),
            Path::new("/site/docs"),
            Path::new("/out"),
            "html",
        );
        assert_eq!(out, PathBuf::from("/out/page.html"));
    }
}
