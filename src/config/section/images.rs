//! `[images]` and `[fonts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! extensions = ["jpg", "jpeg", "png", "webp", "svg"]
//!
//! [images.webp]
//! quality = 80
//! preset = "photo"
//! method = 6
//!
//! [images.optimize]
//! jpeg_min = 70
//! jpeg_max = 80
//! loops = 4
//! quality = "high"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Image sources under `paths.src`.
    pub dir: PathBuf,
    /// Image output under `paths.output`.
    pub output: PathBuf,
    /// Extensions copied verbatim.
    pub extensions: Vec<String>,
    pub webp: WebpConfig,
    pub sprite: SpriteConfig,
    pub optimize: OptimizeConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: "img".into(),
            output: "img".into(),
            extensions: ["jpg", "jpeg", "png", "webp", "svg"]
                .map(String::from)
                .to_vec(),
            webp: WebpConfig::default(),
            sprite: SpriteConfig::default(),
            optimize: OptimizeConfig::default(),
        }
    }
}

/// `[images.webp]` - lossy WebP variants of source photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebpConfig {
    /// Source extensions converted to `.webp`.
    pub extensions: Vec<String>,
    /// Lossy quality, 0..=100.
    pub quality: f32,
    pub preset: WebpPreset,
    /// Effort, 0 (fast) ..= 6 (small).
    pub method: i32,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".into()],
            quality: 80.0,
            preset: WebpPreset::Photo,
            method: 6,
        }
    }
}

/// libwebp encoder presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebpPreset {
    Default,
    Picture,
    Photo,
    Drawing,
    Icon,
    Text,
}

/// `[images.sprite]` - SVG stack sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Icon sources under `images.dir` (top level only).
    pub dir: PathBuf,
    /// Sprite file name under `images.output`.
    pub name: String,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            dir: "svg".into(),
            name: "sprites.svg".into(),
        }
    }
}

/// `[images.optimize]` - build-only in-place recompression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Output extensions visited by the optimizer.
    pub extensions: Vec<String>,
    /// Lowest JPEG quality the search may pick.
    pub jpeg_min: u8,
    /// Highest JPEG quality the search may pick.
    pub jpeg_max: u8,
    /// Binary search iterations.
    pub loops: u32,
    /// Similarity target preset.
    pub quality: JpegTarget,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "gif", "svg"]
                .map(String::from)
                .to_vec(),
            jpeg_min: 70,
            jpeg_max: 80,
            loops: 4,
            quality: JpegTarget::High,
        }
    }
}

/// Structural-similarity targets for JPEG recompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JpegTarget {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl JpegTarget {
    /// Minimum mean SSIM the recompressed image must reach.
    pub fn ssim(self) -> f64 {
        match self {
            Self::Low => 0.93,
            Self::Medium => 0.96,
            Self::High => 0.98,
            Self::VeryHigh => 0.99,
        }
    }
}

/// `[fonts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    pub dir: PathBuf,
    pub output: PathBuf,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: "fonts".into(),
            output: "fonts".into(),
        }
    }
}

impl ImagesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error("images.extensions", "must list at least one extension");
        }
        if !(0.0..=100.0).contains(&self.webp.quality) {
            diag.error("images.webp.quality", "must be within 0..=100");
        }
        if !(0..=6).contains(&self.webp.method) {
            diag.error("images.webp.method", "must be within 0..=6");
        }
        if self.sprite.name.is_empty() || self.sprite.name.contains(['/', '\\']) {
            diag.error("images.sprite.name", "must be a plain file name");
        }

        let opt = &self.optimize;
        if opt.jpeg_max > 100 || opt.jpeg_min == 0 {
            diag.error("images.optimize", "jpeg qualities must be within 1..=100");
        }
        if opt.jpeg_min > opt.jpeg_max {
            diag.error_with_hint(
                "images.optimize.jpeg_min",
                format!("{} is greater than jpeg_max {}", opt.jpeg_min, opt.jpeg_max),
                "swap the two values",
            );
        }
        if opt.loops == 0 {
            diag.error("images.optimize.loops", "must be at least 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut diag = ConfigDiagnostics::new();
        ImagesConfig::default().validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_inverted_quality_band() {
        let mut config = ImagesConfig::default();
        config.optimize.jpeg_min = 90;
        config.optimize.jpeg_max = 60;
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "images.optimize.jpeg_min");
    }

    #[test]
    fn test_preset_deserialize() {
        let config: WebpConfig = toml::from_str("preset = \"drawing\"\nquality = 60").unwrap();
        assert_eq!(config.preset, WebpPreset::Drawing);
        assert_eq!(config.quality, 60.0);
        assert_eq!(config.method, 6);
    }
}
