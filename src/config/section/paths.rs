//! `[paths]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;
use crate::config::util::is_safe_relative;

/// Source and output roots, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Authored sources (read-only to the pipeline).
    pub src: PathBuf,
    /// Built artifacts (fully owned, wiped by `clean`).
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            output: "app".into(),
        }
    }
}

impl PathsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !is_safe_relative(&self.src) {
            diag.error("paths.src", format!("'{}' must be relative to the project root", self.src.display()));
        }
        if !is_safe_relative(&self.output) || self.output.as_os_str().is_empty() {
            diag.error_with_hint(
                "paths.output",
                format!("'{}' must be a non-empty relative path", self.output.display()),
                "the output tree is deleted before every build",
            );
        }
        if self.src == self.output {
            diag.error("paths.output", "output must differ from src");
        }
    }
}
