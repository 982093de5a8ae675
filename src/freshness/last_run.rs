//! Start times of successful operation runs.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, SystemTime};

/// Coarsest mtime resolution in common use (FAT). A run's start is recorded
/// this much earlier so a save in the same tick as the start still counts.
pub const MTIME_GRANULE: Duration = Duration::from_secs(2);

/// Concurrent map from an operation key to the start of its last successful run.
///
/// Recording the *start* time means a file saved while a build is running
/// is picked up again by the next incremental build.
#[derive(Debug)]
pub struct LastRun<K: Eq + Hash> {
    runs: DashMap<K, SystemTime>,
}

impl<K: Eq + Hash> LastRun<K> {
    pub fn new() -> Self {
        Self {
            runs: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<SystemTime> {
        self.runs.get(key).map(|r| *r)
    }

    /// Record a run that started at `started`, less [`MTIME_GRANULE`].
    pub fn record(&self, key: K, started: SystemTime) {
        let since = started.checked_sub(MTIME_GRANULE).unwrap_or(started);
        self.runs.insert(key, since);
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl<K: Eq + Hash> Default for LastRun<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::modified_since;

    #[test]
    fn test_record_and_get() {
        let runs = LastRun::new();
        assert_eq!(runs.get(&"markup:build:site"), None);

        let t = SystemTime::now();
        runs.record("markup:build:site", t);
        assert_eq!(runs.get(&"markup:build:site"), Some(t - MTIME_GRANULE));
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_record_overwrites() {
        let runs = LastRun::new();
        let first = SystemTime::now();
        let second = first + Duration::from_secs(5);
        runs.record(1u8, first);
        runs.record(1u8, second);
        assert_eq!(runs.get(&1), Some(second - MTIME_GRANULE));
    }

    #[test]
    fn test_same_tick_save_is_modified() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.njk");
        std::fs::write(&path, "x").unwrap();

        // a filesystem with whole-second mtimes stores the save before the start
        let started = SystemTime::now();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(started - Duration::from_millis(900))
            .unwrap();

        let runs = LastRun::new();
        runs.record("markup:build:site", started);
        assert!(modified_since(&path, runs.get(&"markup:build:site")));
    }
}
