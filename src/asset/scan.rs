//! Source sets: a root directory plus an extension filter.
//!
//! These replace glob patterns such as `src/img/**/*.{jpg,png}` and are used
//! both for collecting task inputs and for routing watch events.

use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

/// How deep below `root` a set reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// `root/*`
    TopLevel,
    /// `root/**`
    Recursive,
}

#[derive(Debug, Clone)]
pub struct SourceSet {
    pub root: PathBuf,
    /// Lowercase extensions; `None` accepts every file.
    extensions: Option<Vec<String>>,
    depth: Depth,
}

impl SourceSet {
    /// `root/**/*.{exts}`
    pub fn recursive(root: impl Into<PathBuf>, extensions: &[impl AsRef<str>]) -> Self {
        Self::new(root, Some(extensions), Depth::Recursive)
    }

    /// `root/*.{exts}`
    pub fn top_level(root: impl Into<PathBuf>, extensions: &[impl AsRef<str>]) -> Self {
        Self::new(root, Some(extensions), Depth::TopLevel)
    }

    /// `root/**`
    pub fn any(root: impl Into<PathBuf>) -> Self {
        Self::new::<&str>(root, None, Depth::Recursive)
    }

    fn new<S: AsRef<str>>(root: impl Into<PathBuf>, extensions: Option<&[S]>, depth: Depth) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.map(|exts| {
                exts.iter()
                    .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                    .collect()
            }),
            depth,
        }
    }

    /// Whether `path` (absolute, not necessarily existing) belongs to the set.
    pub fn matches(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        let components: Vec<_> = rel.components().collect();
        if components.is_empty() {
            return false;
        }
        if self.depth == Depth::TopLevel && components.len() != 1 {
            return false;
        }
        if components
            .iter()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return false;
        }
        self.matches_extension(path)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(exts) = &self.extensions else {
            return true;
        };
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Collect matching files, sorted. A missing root yields nothing.
    ///
    /// The walk is serial: sets are collected from inside rayon groups, and
    /// jwalk's pooled walk gives up once the pool stays busy.
    pub fn collect(&self) -> io::Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let max_depth = match self.depth {
            Depth::TopLevel => 1,
            Depth::Recursive => usize::MAX,
        };
        let walk = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(true)
            .max_depth(max_depth);

        let mut files = Vec::new();
        for entry in walk {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                let path = entry.path();
                if self.matches_extension(&path) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Path of `file` relative to the set root.
    pub fn relative<'a>(&self, file: &'a Path) -> Option<&'a Path> {
        file.strip_prefix(&self.root).ok()
    }
}
