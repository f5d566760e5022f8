//! Lossless PNG and GIF re-encoding.

use std::io::Cursor;

use anyhow::Result;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{AnimationDecoder, ImageFormat};

/// Best compression with adaptive filtering; pixels are unchanged.
pub fn recompress_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)?;
    let mut buf = Cursor::new(Vec::new());
    img.write_with_encoder(PngEncoder::new_with_quality(
        &mut buf,
        CompressionType::Best,
        FilterType::Adaptive,
    ))?;
    Ok(buf.into_inner())
}

/// Re-encode every frame with its delay, looping forever.
pub fn recompress_gif(data: &[u8]) -> Result<Vec<u8>> {
    let frames = GifDecoder::new(Cursor::new(data))?
        .into_frames()
        .collect_frames()?;

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(frames)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let img = RgbaImage::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 0, 255]));
        let mut raw = Cursor::new(Vec::new());
        img.write_to(&mut raw, ImageFormat::Png).unwrap();

        let out = recompress_png(raw.get_ref()).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_gif_keeps_frames() {
        let frames = (0..3).map(|i| {
            image::Frame::new(RgbaImage::from_pixel(4, 4, Rgba([i * 80, 0, 0, 255])))
        });
        let mut raw = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut raw);
            encoder.encode_frames(frames).unwrap();
        }

        let out = recompress_gif(&raw).unwrap();
        let count = GifDecoder::new(Cursor::new(out))
            .unwrap()
            .into_frames()
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_png_rejects_garbage() {
        assert!(recompress_png(b"nope").is_err());
    }
}
