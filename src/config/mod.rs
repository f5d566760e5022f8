//! Pipeline configuration from an optional `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/   # [paths] [styles] [scripts] [markup] [images] [fonts] [cache] [serve]
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── util       # config file discovery
//! └── mod.rs     # Config (this file)
//! ```
//!
//! Every field has a default matching the stock `src/` → `app/` layout, so a
//! missing config file is not an error.

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{
    BrowserTargets, CacheConfig, FontsConfig, ImagesConfig, JpegTarget, MarkupConfig,
    OptimizeConfig, PathsConfig, ScriptsConfig, ServeConfig, StylesConfig,
    WebpConfig, WebpPreset,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{cli::Cli, log};
use util::find_config_file;

/// Default config file name.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root - parent of the config file, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Config file in use, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub paths: PathsConfig,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub markup: MarkupConfig,
    pub images: ImagesConfig,
    pub fonts: FontsConfig,
    pub cache: CacheConfig,
    pub serve: ServeConfig,
}

impl Config {
    /// Load configuration for the CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, the
    /// current directory is the project root and defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                Self::default()
            }
        };

        if config.root.as_os_str().is_empty() {
            config.root =
                std::env::current_dir().context("Failed to get current working directory")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Defaults rooted at `root` (tests and programmatic use).
    pub fn with_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {} (ignored):", CONFIG_FILE);
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Validate all sections, collecting every problem before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.paths.validate(&mut diag);
        self.styles.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.markup.validate(&mut diag);
        self.images.validate(&mut diag);
        self.cache.validate(&mut diag);
        diag.into_result()
    }

    // ========================================================================
    // resolved paths
    // ========================================================================

    /// Source tree root.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.paths.src)
    }

    /// Output tree root.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }

    pub fn styles_src(&self) -> PathBuf {
        self.src_dir().join(&self.styles.dir)
    }

    pub fn styles_out(&self) -> PathBuf {
        self.output_dir().join(&self.styles.output)
    }

    pub fn scripts_src(&self) -> PathBuf {
        self.src_dir().join(&self.scripts.dir)
    }

    pub fn scripts_entry(&self) -> PathBuf {
        self.scripts_src().join(&self.scripts.entry)
    }

    pub fn scripts_out(&self) -> PathBuf {
        self.output_dir()
            .join(&self.scripts.output)
            .join(&self.scripts.filename)
    }

    pub fn images_src(&self) -> PathBuf {
        self.src_dir().join(&self.images.dir)
    }

    pub fn images_out(&self) -> PathBuf {
        self.output_dir().join(&self.images.output)
    }

    pub fn sprite_src(&self) -> PathBuf {
        self.images_src().join(&self.images.sprite.dir)
    }

    pub fn sprite_out(&self) -> PathBuf {
        self.images_out().join(&self.images.sprite.name)
    }

    pub fn fonts_src(&self) -> PathBuf {
        self.src_dir().join(&self.fonts.dir)
    }

    pub fn fonts_out(&self) -> PathBuf {
        self.output_dir().join(&self.fonts.output)
    }

    pub fn partials_dir(&self) -> PathBuf {
        self.src_dir().join(&self.markup.partials)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir().join(&self.cache.manifest)
    }

    /// Path relative to the project root, for log output.
    pub fn display_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        crate::utils::path::to_slash(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.paths.src, PathBuf::from("src"));
        assert_eq!(config.paths.output, PathBuf::from("app"));
        assert_eq!(config.styles.suffix, ".min");
        assert_eq!(config.scripts.filename, "main.js");
        assert_eq!(config.cache.manifest, "rev.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_str(
            r#"
            [paths]
            output = "dist"

            [images.webp]
            quality = 70
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.paths.src, PathBuf::from("src"));
        assert_eq!(config.images.webp.quality, 70.0);
        assert_eq!(config.images.webp.method, 6);
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = Config::parse_with_ignored("[paths]\nsrcs = \"x\"\n").unwrap();
        assert_eq!(ignored, vec!["paths.srcs".to_string()]);
    }

    #[test]
    fn test_validation_rejects_escaping_output() {
        let config = Config::from_str("[paths]\noutput = \"../elsewhere\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Diagnostics(_))
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_script_target() {
        let config = Config::from_str("[scripts]\ntarget = \"es5\"").unwrap();
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("es5 accepted");
        };
        assert_eq!(diag.errors()[0].field, "scripts.target");
    }

    #[test]
    fn test_resolved_paths() {
        let config = Config::with_root(Path::new("/site"));
        assert_eq!(config.styles_src(), PathBuf::from("/site/src/scss"));
        assert_eq!(config.scripts_out(), PathBuf::from("/site/app/js/main.js"));
        assert_eq!(config.sprite_src(), PathBuf::from("/site/src/img/svg"));
        assert_eq!(config.sprite_out(), PathBuf::from("/site/app/img/sprites.svg"));
        assert_eq!(config.manifest_path(), PathBuf::from("/site/app/rev.json"));
        assert_eq!(
            config.display_path(Path::new("/site/src/scss/main.scss")),
            "src/scss/main.scss"
        );
    }
}
