//! `[cache]` section configuration (content-hash renaming).

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Extensions renamed with a content hash.
    pub extensions: Vec<String>,
    /// Manifest file name in the output root.
    pub manifest: String,
    /// Hex chars of the hash kept in file names.
    pub hash_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            extensions: ["css", "js", "svg", "png", "jpg", "jpeg", "woff2"]
                .map(String::from)
                .to_vec(),
            manifest: "rev.json".into(),
            hash_len: 10,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error("cache.extensions", "must list at least one extension");
        }
        if !(6..=64).contains(&self.hash_len) {
            diag.error("cache.hash_len", "must be within 6..=64");
        }
        if self.manifest.is_empty() || self.manifest.contains(['/', '\\']) {
            diag.error("cache.manifest", "must be a plain file name");
        }
    }
}
