use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet period after the last event before a batch is released.
pub(super) const DEBOUNCE_MS: u64 = 300;
/// Minimum gap between two released batches.
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;

/// Collects notify events into batches.
///
/// Only timing and per-path deduplication live here; deciding what a
/// change means is the subscriptions' job.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_batch: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_batch: None,
        }
    }

    /// Record a notify event.
    ///
    /// `touch` and close-after-write count as modifications. Other
    /// metadata changes (permissions, ownership, access time) are dropped.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::{AccessKind, AccessMode, MetadataKind, ModifyKind};

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime | MetadataKind::Any)) => {
                ChangeKind::Modified
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);
            crate::debug!("watch"; "{}: {}", kind.label(), path.display());
            self.record(path, kind);
            self.last_event = Some(Instant::now());
        }
    }

    /// Merge `kind` into whatever is already pending for `path`.
    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        use ChangeKind::{Created, Modified, Removed};

        let Some(&pending) = self.changes.get(&path) else {
            self.changes.insert(path, kind);
            return;
        };

        match (pending, kind) {
            // deleted, then written again
            (Removed, Created | Modified) => {
                self.changes.insert(path, kind);
            }
            (Modified, Removed) => {
                self.changes.insert(path, Removed);
            }
            // appeared and vanished inside one window
            (Created, Removed) => {
                self.changes.remove(&path);
            }
            // otherwise the first event stands
            _ => {}
        }
    }

    /// Release the pending batch once the quiet period and the cooldown
    /// have both elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;

        if changes.is_empty() {
            return None;
        }

        self.last_batch = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_batch) = self.last_batch
            && last_batch.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Time until the pending batch could be released.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_batch
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Editor swap, backup and hidden files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
