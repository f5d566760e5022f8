//! Content-hash renaming and the manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::RevError;
use crate::asset::SourceSet;
use crate::config::Config;
use crate::utils::{hash, path::to_slash};

/// Original output-relative path → hashed output-relative path.
pub type Manifest = BTreeMap<String, String>;

/// Rename every matching output file to `{stem}-{hash}.{ext}` and write the
/// manifest. Returns the manifest and the files renamed by this run.
///
/// Files already named after their current content are kept, so running
/// twice yields the same tree and manifest.
pub fn rev_files(config: &Config) -> Result<(Manifest, Vec<PathBuf>), RevError> {
    let output = config.output_dir();
    let hash_len = config.cache.hash_len;
    let set = SourceSet::recursive(&output, &config.cache.extensions);

    let mut manifest = Manifest::new();
    let mut renamed = Vec::new();
    for path in set.collect().map_err(RevError::io(&output))? {
        let bytes = fs::read(&path).map_err(RevError::io(&path))?;
        let digest = hash::fingerprint(&bytes, hash_len);

        let (original, hashed) = match split_hashed(&path, hash_len) {
            Some((original, existing)) if existing == digest => (original, path.clone()),
            _ => {
                let hashed = hashed_path(&path, &digest);
                fs::rename(&path, &hashed).map_err(RevError::io(&path))?;
                renamed.push(hashed.clone());
                (path.clone(), hashed)
            }
        };

        let rel = |p: &Path| to_slash(p.strip_prefix(&output).unwrap_or(p));
        manifest.insert(rel(&original), rel(&hashed));
    }

    let manifest_path = config.manifest_path();
    let json = serde_json::to_string_pretty(&manifest).map_err(|source| {
        RevError::InvalidManifest {
            path: manifest_path.clone(),
            source,
        }
    })?;
    fs::write(&manifest_path, json).map_err(RevError::io(&manifest_path))?;

    Ok((manifest, renamed))
}

pub fn read_manifest(path: &Path) -> Result<Manifest, RevError> {
    if !path.is_file() {
        return Err(RevError::MissingManifest(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(RevError::io(path))?;
    serde_json::from_str(&content).map_err(|source| RevError::InvalidManifest {
        path: path.to_path_buf(),
        source,
    })
}

/// `css/main.min.css` + `abc` → `css/main.min-abc.css`
fn hashed_path(path: &Path, digest: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{digest}.{ext}"),
        None => format!("{stem}-{digest}"),
    };
    path.with_file_name(name)
}

/// Split `main.min-abc.css` into (`main.min.css`, `abc`) when the suffix
/// looks like a fingerprint.
fn split_hashed(path: &Path, hash_len: usize) -> Option<(PathBuf, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (base, suffix) = stem.rsplit_once('-')?;
    if base.is_empty() || !hash::is_fingerprint(suffix, hash_len) {
        return None;
    }
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    };
    Some((path.with_file_name(name), suffix.to_string()))
}
