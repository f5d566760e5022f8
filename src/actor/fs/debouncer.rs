use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet window before a batch is released.
pub(super) const DEBOUNCE_MS: u64 = 300;

/// Pure debouncer: only handles timing and event deduplication.
pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → dropped (appeared then vanished)
    /// - otherwise: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // mtime/atime/chmod noise
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            self.record(normalize_path(path), kind);
        }
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        self.last_event = Some(Instant::now());

        let Some(&existing) = self.changes.get(&path) else {
            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            return;
        };

        match (existing, kind) {
            (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                crate::debug!("watch"; "restore {}->{}: {}", existing.label(), kind.label(), path.display());
                self.changes.insert(path, kind);
            }
            (ChangeKind::Modified, ChangeKind::Removed) => {
                crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                self.changes.insert(path, ChangeKind::Removed);
            }
            (ChangeKind::Created, ChangeKind::Removed) => {
                crate::debug!("watch"; "discard created+removed: {}", path.display());
                self.changes.remove(&path);
            }
            _ => {}
        }
    }

    /// Take the batch once the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        (!changes.is_empty()).then_some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= Duration::from_millis(DEBOUNCE_MS) && !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
