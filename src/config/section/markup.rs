//! `[markup]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Directive prefix; `@` accepts both `@include` and `@@include`.
    pub prefix: String,
    /// Partials directory under `paths.src` (watched, never emitted).
    pub partials: PathBuf,
    /// Maximum include nesting.
    pub max_depth: usize,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            prefix: "@".into(),
            partials: "html".into(),
            max_depth: 32,
        }
    }
}

impl MarkupConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.prefix.is_empty() {
            diag.error("markup.prefix", "must not be empty");
        }
        if self.prefix.chars().any(|c| c.is_alphanumeric() || c == '(') {
            diag.error_with_hint(
                "markup.prefix",
                format!("'{}' would collide with directive names", self.prefix),
                "use punctuation such as \"@\"",
            );
        }
        if self.max_depth == 0 {
            diag.error("markup.max_depth", "must be at least 1");
        }
    }
}
