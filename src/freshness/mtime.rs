//! Mtime-based freshness checks.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Whether `path` was modified at or after `since`.
///
/// No reference time means everything is stale. A file whose mtime cannot
/// be read is treated as modified so it is never silently skipped.
pub fn modified_since(path: &Path, since: Option<SystemTime>) -> bool {
    let Some(since) = since else {
        return true;
    };
    get_mtime(path).is_none_or(|mtime| mtime >= since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_get_mtime_missing() {
        assert!(get_mtime(Path::new("/definitely/not/here.njk")).is_none());
    }

    #[test]
    fn test_modified_since() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.njk");
        std::fs::write(&path, "x").unwrap();
        let mtime = get_mtime(&path).unwrap();

        assert!(modified_since(&path, None));
        assert!(modified_since(&path, Some(mtime)));
        assert!(modified_since(&path, Some(mtime - Duration::from_secs(60))));
        assert!(!modified_since(&path, Some(mtime + Duration::from_secs(60))));
    }

    #[test]
    fn test_unreadable_counts_as_modified() {
        let since = SystemTime::now();
        assert!(modified_since(Path::new("/missing/file.njk"), Some(since)));
    }
}
