//! Verbatim copies from a source set into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::SourceSet;

/// Copy every file of `set` under `dest`, preserving relative paths.
///
/// Returns the written output paths. The first I/O error aborts the copy.
pub fn copy_set(set: &SourceSet, dest: &Path) -> Result<Vec<PathBuf>> {
    let files = set
        .collect()
        .with_context(|| format!("Failed to scan {}", set.root.display()))?;

    files
        .par_iter()
        .map(|src| {
            let rel = set
                .relative(src)
                .with_context(|| format!("{} is outside {}", src.display(), set.root.display()))?;
            let out = dest.join(rel);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(src, &out).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), out.display())
            })?;
            Ok(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_is_byte_identical_for_all_image_types() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src/img");
        let out = dir.path().join("app/img");

        let mut expected = Vec::new();
        for (i, rel) in ["a.jpg", "b.jpeg", "deep/c.png", "d.webp", "svg/e.svg"]
            .iter()
            .enumerate()
        {
            let path = src.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            let bytes: Vec<u8> = (0..=255u8).cycle().skip(i * 7).take(1024 + i).collect();
            fs::write(&path, &bytes).unwrap();
            expected.push((rel.to_string(), bytes));
        }
        fs::write(src.join("notes.txt"), "not an image").unwrap();

        let set = SourceSet::recursive(&src, &["jpg", "jpeg", "png", "webp", "svg"]);
        let written = copy_set(&set, &out).unwrap();
        assert_eq!(written.len(), expected.len());

        for (rel, bytes) in expected {
            assert_eq!(fs::read(out.join(&rel)).unwrap(), bytes, "{rel}");
        }
        assert!(!out.join("notes.txt").exists());
    }

    #[test]
    fn test_copy_missing_source_is_noop() {
        let dir = TempDir::new().unwrap();
        let set = SourceSet::any(dir.path().join("src/fonts"));
        let written = copy_set(&set, &dir.path().join("app/fonts")).unwrap();
        assert!(written.is_empty());
    }
}
