//! JPEG recompression guided by structural similarity.

use std::io::Cursor;

use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat};

use crate::config::OptimizeConfig;

const BLOCK: u32 = 8;
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Binary-search the lowest quality in `[jpeg_min, jpeg_max]` whose
/// similarity to the original meets the configured target.
///
/// Falls back to `jpeg_max` when no tried quality is good enough.
pub fn recompress_jpeg(data: &[u8], settings: &OptimizeConfig) -> Result<Vec<u8>> {
    let original = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    let original = DynamicImage::ImageRgb8(original.to_rgb8());
    let reference = original.to_luma8();
    let target = settings.quality.ssim();

    let (mut lo, mut hi) = (settings.jpeg_min, settings.jpeg_max);
    let mut best = None;
    for _ in 0..settings.loops {
        if lo > hi {
            break;
        }
        let quality = lo + (hi - lo) / 2;
        let candidate = encode(&original, quality)?;
        let decoded = image::load_from_memory_with_format(&candidate, ImageFormat::Jpeg)?;
        if ssim(&reference, &decoded.to_luma8()) >= target {
            best = Some(candidate);
            if quality == 0 {
                break;
            }
            hi = quality - 1;
        } else {
            lo = quality + 1;
        }
    }

    match best {
        Some(bytes) => Ok(bytes),
        None => encode(&original, settings.jpeg_max),
    }
}

fn encode(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf.into_inner())
}

/// Mean SSIM over non-overlapping 8×8 luma blocks.
///
/// Images of different sizes score 0.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() || a.width() == 0 || a.height() == 0 {
        return 0.0;
    }
    let (width, height) = a.dimensions();
    let (bw, bh) = (BLOCK.min(width), BLOCK.min(height));

    let mut total = 0.0;
    let mut blocks = 0usize;
    let mut y = 0;
    while y + bh <= height {
        let mut x = 0;
        while x + bw <= width {
            total += block_ssim(a, b, x, y, bw, bh);
            blocks += 1;
            x += bw;
        }
        y += bh;
    }
    total / blocks as f64
}

fn block_ssim(a: &GrayImage, b: &GrayImage, x0: u32, y0: u32, w: u32, h: u32) -> f64 {
    let n = f64::from(w * h);
    let (mut sum_a, mut sum_b) = (0.0, 0.0);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            sum_a += f64::from(a.get_pixel(x, y).0[0]);
            sum_b += f64::from(b.get_pixel(x, y).0[0]);
        }
    }
    let (mean_a, mean_b) = (sum_a / n, sum_b / n);

    let (mut var_a, mut var_b, mut cov) = (0.0, 0.0, 0.0);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let da = f64::from(a.get_pixel(x, y).0[0]) - mean_a;
            let db = f64::from(b.get_pixel(x, y).0[0]) - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
    }
    let (var_a, var_b, cov) = (var_a / n, var_b / n, cov / n);

    ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
        / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2))
}
