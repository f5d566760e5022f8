//! In-place recompression of the built image tree.
//!
//! A result replaces the file only when it is strictly smaller. WebP files
//! and the sprite sheet are never touched.

mod jpeg;
mod raster;
mod svg;

pub use jpeg::recompress_jpeg;
pub use raster::{recompress_gif, recompress_png};
pub use svg::optimize_svg;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::sprite::is_sprite;
use crate::asset::SourceSet;
use crate::config::{Config, OptimizeConfig};
use crate::debug;

/// Optimize every matching output image, returning the files rewritten.
pub fn optimize_images(config: &Config) -> Result<Vec<PathBuf>> {
    let settings = &config.images.optimize;
    let root = config.images_out();
    let files: Vec<PathBuf> = SourceSet::recursive(&root, &settings.extensions)
        .collect()
        .with_context(|| format!("Failed to scan {}", config.display_path(&root)))?
        .into_iter()
        .filter(|p| !is_sprite(config, p))
        .collect();

    let results: Vec<Option<PathBuf>> = files
        .par_iter()
        .map(|path| {
            optimize_file(path, settings)
                .with_context(|| format!("Failed to optimize {}", config.display_path(path)))
        })
        .collect::<Result<_>>()?;

    Ok(results.into_iter().flatten().collect())
}

fn optimize_file(path: &Path, settings: &OptimizeConfig) -> Result<Option<PathBuf>> {
    let original = fs::read(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let optimized = match ext.as_str() {
        "jpg" | "jpeg" => Some(recompress_jpeg(&original, settings)?),
        "png" => Some(recompress_png(&original)?),
        "gif" => Some(recompress_gif(&original)?),
        "svg" => optimize_svg(&original)?,
        _ => None,
    };

    match optimized {
        Some(bytes) if bytes.len() < original.len() => {
            debug!("imagemin"; "{}: {} -> {} bytes", path.display(), original.len(), bytes.len());
            fs::write(path, bytes)?;
            Ok(Some(path.to_path_buf()))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sprite_and_webp_untouched() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let img = root.join("app/img");
        fs::create_dir_all(&img).unwrap();
        let sprite = "<svg xmlns=\"http://www.w3.org/2000/svg\">   <style>:root>svg{display:none}</style>   </svg>";
        fs::write(img.join("sprites.svg"), sprite).unwrap();
        fs::write(img.join("photo.webp"), b"RIFF....WEBP").unwrap();

        let config = Config::with_root(root);
        let written = optimize_images(&config).unwrap();

        assert!(written.is_empty());
        assert_eq!(fs::read_to_string(img.join("sprites.svg")).unwrap(), sprite);
        assert_eq!(fs::read(img.join("photo.webp")).unwrap(), b"RIFF....WEBP");
    }

    #[test]
    fn test_svg_rewritten_when_smaller() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let icon = root.join("app/img/icon.svg");
        fs::create_dir_all(icon.parent().unwrap()).unwrap();
        let bloated = "<?xml version=\"1.0\"?>\n<!-- exported -->\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\n    <g>\n        <g>\n            <rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" fill=\"#ff0000\"/>\n        </g>\n    </g>\n</svg>\n";
        fs::write(&icon, bloated).unwrap();

        let config = Config::with_root(root);
        let written = optimize_images(&config).unwrap();

        assert_eq!(written, vec![icon.clone()]);
        assert!(fs::read(&icon).unwrap().len() < bloated.len());
    }

    #[test]
    fn test_corrupt_image_is_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let bad = root.join("app/img/bad.png");
        fs::create_dir_all(bad.parent().unwrap()).unwrap();
        fs::write(&bad, b"not a png").unwrap();

        assert!(optimize_images(&Config::with_root(root)).is_err());
    }
}
