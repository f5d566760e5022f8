//! Lossy WebP conversion.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use libwebp_sys::{WebPConfig, WebPPreset};
use rayon::prelude::*;
use webp::Encoder;

use crate::asset::SourceSet;
use crate::config::{Config, WebpConfig as WebpSettings, WebpPreset as Preset};

/// Write `{stem}.webp` next to the copied original for every matching source.
pub fn convert_webp(config: &Config) -> Result<Vec<PathBuf>> {
    let settings = &config.images.webp;
    let set = SourceSet::recursive(config.images_src(), &settings.extensions);
    let out_root = config.images_out();

    set.collect()
        .with_context(|| format!("Failed to scan {}", config.display_path(&set.root)))?
        .par_iter()
        .map(|src| {
            let rel = set.relative(src).unwrap_or(src);
            let out = out_root.join(rel).with_extension("webp");
            convert_file(src, &out, settings)
                .with_context(|| format!("Failed to convert {}", config.display_path(src)))?;
            Ok(out)
        })
        .collect()
}

fn convert_file(src: &Path, out: &Path, settings: &WebpSettings) -> Result<()> {
    let img = image::open(src)?;
    let bytes = encode(&img, settings)?;
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, bytes)?;
    Ok(())
}

/// Encode with libwebp's preset tuning, quality and effort.
pub fn encode(img: &DynamicImage, settings: &WebpSettings) -> Result<Vec<u8>> {
    let img = match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img.clone(),
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let encoder = Encoder::from_image(&img).map_err(|err| anyhow!("{err}"))?;
    let mut webp_config = WebPConfig::new_with_preset(preset(settings.preset), settings.quality)
        .map_err(|_| anyhow!("invalid webp settings"))?;
    webp_config.method = settings.method;

    let memory = encoder
        .encode_advanced(&webp_config)
        .map_err(|err| anyhow!("webp encoding failed: {err:?}"))?;
    Ok(memory.to_vec())
}

fn preset(preset: Preset) -> WebPPreset {
    match preset {
        Preset::Default => WebPPreset::WEBP_PRESET_DEFAULT,
        Preset::Picture => WebPPreset::WEBP_PRESET_PICTURE,
        Preset::Photo => WebPPreset::WEBP_PRESET_PHOTO,
        Preset::Drawing => WebPPreset::WEBP_PRESET_DRAWING,
        Preset::Icon => WebPPreset::WEBP_PRESET_ICON,
        Preset::Text => WebPPreset::WEBP_PRESET_TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]))
    }

    #[test]
    fn test_convert_mirrors_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let photo = root.join("src/img/gallery/photo.jpg");
        fs::create_dir_all(photo.parent().unwrap()).unwrap();
        gradient(64, 48).save_with_format(&photo, ImageFormat::Jpeg).unwrap();
        gradient(8, 8)
            .save_with_format(root.join("src/img/icon.png"), ImageFormat::Png)
            .unwrap();

        let config = Config::with_root(root);
        let written = convert_webp(&config).unwrap();

        let out = root.join("app/img/gallery/photo.webp");
        assert_eq!(written, vec![out.clone()]);
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
        assert!(!root.join("app/img/icon.webp").exists());
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let img = DynamicImage::ImageRgb8(gradient(64, 64));
        let mut settings = WebpSettings::default();
        let high = encode(&img, &settings).unwrap();
        settings.quality = 10.0;
        let low = encode(&img, &settings).unwrap();
        assert!(low.len() <= high.len());
    }
}
