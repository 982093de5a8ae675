//! Output file writing.

use std::io;
use std::path::Path;

/// Write `content` to `path`, creating parent directories.
///
/// Returns `Ok(false)` without touching the file when it already holds
/// exactly `content`, so unchanged outputs keep their mtime and do not wake
/// watchers.
pub fn write_if_changed(path: &Path, content: &[u8]) -> io::Result<bool> {
    if let Ok(existing) = std::fs::read(path)
        && existing == content
    {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.html");
        assert!(write_if_changed(&path, b"<p>hi</p>").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_unchanged_content_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.html");
        assert!(write_if_changed(&path, b"same").unwrap());
        assert!(!write_if_changed(&path, b"same").unwrap());
        assert!(write_if_changed(&path, b"different").unwrap());
    }
}
