//! Watch table: which task a changed path belongs to.

use std::path::{Path, PathBuf};

use crate::asset::SourceSet;
use crate::config::Config;
use crate::core::{TaskKind, Variant};

/// Source sets, each bound to exactly one task.
pub struct WatchTable {
    entries: Vec<(SourceSet, TaskKind)>,
}

impl WatchTable {
    pub fn from_config(config: &Config) -> Self {
        let entries = vec![
            (
                SourceSet::recursive(config.styles_src(), &["scss"]),
                TaskKind::Styles(Variant::Dev),
            ),
            (
                SourceSet::recursive(config.scripts_src(), &["js"]),
                TaskKind::Scripts(Variant::Dev),
            ),
            (
                SourceSet::recursive(config.partials_dir(), &["html"]),
                TaskKind::Html,
            ),
            (
                SourceSet::top_level(config.src_dir(), &["html"]),
                TaskKind::Html,
            ),
            (SourceSet::any(config.fonts_src()), TaskKind::Fonts),
            (
                SourceSet::recursive(config.images_src(), &config.images.extensions),
                TaskKind::Images,
            ),
            (
                SourceSet::top_level(config.sprite_src(), &["svg"]),
                TaskKind::Sprites,
            ),
        ];
        Self { entries }
    }

    /// Tasks affected by a batch of changes, each at most once, in table order.
    pub fn route<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) -> Vec<TaskKind> {
        let paths: Vec<&Path> = paths.into_iter().collect();
        let mut tasks = Vec::new();
        for (set, kind) in &self.entries {
            if tasks.contains(kind) {
                continue;
            }
            if paths.iter().any(|p| set.matches(p)) {
                tasks.push(*kind);
            }
        }
        tasks
    }

    /// Directories to watch recursively.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for (set, _) in &self.entries {
            if !roots.iter().any(|r| set.root.starts_with(r)) {
                roots.retain(|r| !r.starts_with(&set.root));
                roots.push(set.root.clone());
            }
        }
        roots
    }
}
