//! Output tree cleaning.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Remove everything inside `dir`, keeping `dir` itself.
///
/// A missing directory is created. Returns the number of removed entries.
pub fn clean_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let result = if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("Failed to remove {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}
