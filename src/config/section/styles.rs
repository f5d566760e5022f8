//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! dir = "scss"
//! suffix = ".min"
//!
//! [styles.targets]
//! chrome = "80"
//! safari = "13.1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Stylesheet sources under `paths.src`.
    pub dir: PathBuf,
    /// Compiled stylesheets under `paths.output`.
    pub output: PathBuf,
    /// Inserted before `.css` in every output name.
    pub suffix: String,
    /// Write `.map` files in dev variant.
    pub source_maps: bool,
    /// Browser minimum versions used for vendor prefixing.
    pub targets: BrowserTargets,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            dir: "scss".into(),
            output: "css".into(),
            suffix: ".min".into(),
            source_maps: true,
            targets: BrowserTargets::default(),
        }
    }
}

/// Minimum browser versions, written as `"major"` or `"major.minor"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTargets {
    pub chrome: Option<String>,
    pub firefox: Option<String>,
    pub safari: Option<String>,
    pub edge: Option<String>,
    pub ios_saf: Option<String>,
    pub samsung: Option<String>,
    pub opera: Option<String>,
    pub android: Option<String>,
    pub ie: Option<String>,
}

impl Default for BrowserTargets {
    fn default() -> Self {
        // Roughly browserslist "defaults" without the legacy flexbox era.
        Self {
            chrome: Some("80".into()),
            firefox: Some("78".into()),
            safari: Some("13".into()),
            edge: Some("88".into()),
            ios_saf: Some("13".into()),
            samsung: Some("12".into()),
            opera: Some("67".into()),
            android: Some("80".into()),
            ie: None,
        }
    }
}

impl BrowserTargets {
    /// Iterate `(name, version)` pairs that are set.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("chrome", &self.chrome),
            ("firefox", &self.firefox),
            ("safari", &self.safari),
            ("edge", &self.edge),
            ("ios_saf", &self.ios_saf),
            ("samsung", &self.samsung),
            ("opera", &self.opera),
            ("android", &self.android),
            ("ie", &self.ie),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_deref().map(|v| (name, v)))
    }
}

/// Parse `"13"`, `"13.1"` or `"13.1.2"` into lightningcss' packed version.
pub fn parse_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if major > 255 || minor > 255 || patch > 255 {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

impl StylesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, version) in self.targets.entries() {
            if parse_version(version).is_none() {
                diag.error_with_hint(
                    "styles.targets",
                    format!("invalid version '{version}' for {name}"),
                    "use \"major\" or \"major.minor\"",
                );
            }
        }
        if self.targets.entries().next().is_none() {
            diag.error("styles.targets", "at least one browser target is required");
        }
    }
}
