//! `[scripts]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Script sources under `paths.src` (also the watch root).
    pub dir: PathBuf,
    /// Bundle entry, relative to `dir`.
    pub entry: PathBuf,
    /// Bundle directory under `paths.output`.
    pub output: PathBuf,
    /// Bundle file name, identical in both variants.
    pub filename: String,
    /// Syntax lowering target (`es2015`, `es2017`, `esnext`, ...).
    pub target: String,
    /// Path components whose modules are bundled as-is.
    pub exclude: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: "js".into(),
            entry: "main.js".into(),
            output: "js".into(),
            filename: "main.js".into(),
            target: "es2015".into(),
            exclude: vec!["node_modules".into(), "bower_components".into()],
        }
    }
}

impl ScriptsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.filename.is_empty() || self.filename.contains(['/', '\\']) {
            diag.error("scripts.filename", "must be a plain file name");
        }
        if self.target.trim().is_empty() {
            diag.error("scripts.target", "must not be empty");
        } else if !crate::script::is_supported_target(&self.target) {
            diag.error_with_hint(
                "scripts.target",
                format!("unsupported target `{}`", self.target),
                "use es2015 through es2026 or esnext, optionally with engines like `es2017,safari13`",
            );
        }
    }
}
