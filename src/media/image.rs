//! Raster image re-encoding.

use super::{Compression, MediaError, Optimised, Outcome, Status};
use crate::{
    debug,
    utils::{
        exec::{Cmd, SILENT_FILTER},
        mime::types,
    },
};
use image::{
    DynamicImage, ImageFormat, Rgb, RgbImage, Rgba,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
    imageops::FilterType as ResizeFilter,
};
use std::{fs, io::Cursor, path::Path};

/// Images below this size are not worth re-encoding.
pub const MIN_IMAGE_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    /// JPEG quality (1-100).
    pub quality: u8,
    /// Try WebP and keep it when smaller.
    pub webp: bool,
    /// Longest side after resizing.
    pub max_dimension: Option<u32>,
}

/// Decode, resize if too large, re-encode.
///
/// WebP wins when enabled and smaller; otherwise the source format is kept.
/// With an `encoder` (ffmpeg) WebP is lossy at `quality`, without one lossless.
pub fn optimise_image(data: &[u8], opts: &ImageOptions, encoder: Option<&Path>) -> Outcome {
    if data.len() < MIN_IMAGE_BYTES {
        return Outcome::skipped(Status::SkippedSmall, format!("Too small: {} bytes", data.len()));
    }

    let Some((format, img)) = load(data) else {
        return Outcome::skipped(Status::SkippedInvalid, "Invalid or unsupported image format");
    };
    let img = match opts.max_dimension {
        Some(max) => fit_within(img, max),
        None => img,
    };

    if opts.webp {
        match encode_webp(&img, opts.quality, encoder) {
            Ok(bytes) if bytes.len() < data.len() => {
                return Outcome::optimised(
                    Status::ProcessedWebp,
                    Optimised {
                        bytes,
                        mime: types::WEBP.to_owned(),
                        compression: Compression::None,
                    },
                );
            }
            Ok(_) => {}
            Err(e) => return Outcome::skipped(Status::SkippedError, format!("Exception: {e}")),
        }
    }

    match encode_as(&img, format, opts.quality) {
        Ok(bytes) if bytes.len() < data.len() => Outcome::optimised(
            Status::Processed,
            Optimised {
                bytes,
                mime: format_mime(format).to_owned(),
                compression: Compression::None,
            },
        ),
        Ok(_) => Outcome::skipped(Status::SkippedNoReduction, "No size reduction achieved"),
        Err(e) => Outcome::skipped(Status::SkippedError, format!("Exception: {e}")),
    }
}

/// Re-encode a PNG as JPEG, flattening transparency onto white.
pub fn convert_png_to_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)?;
    let flat = DynamicImage::ImageRgb8(flatten_on_white(&img));
    encode_jpeg(&flat, quality)
}

fn load(data: &[u8]) -> Option<(ImageFormat, DynamicImage)> {
    let format = image::guess_format(data).ok()?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP | ImageFormat::Bmp
    ) {
        return None;
    }
    let img = image::load_from_memory_with_format(data, format).ok()?;
    Some((format, img))
}

/// Scale down so the longer side is at most `max`, keeping the aspect ratio.
fn fit_within(img: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let longest = width.max(height);
    if longest <= max {
        return img;
    }

    let scale = max as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    img.resize_exact(new_width, new_height, ResizeFilter::Lanczos3)
}

fn encode_as(img: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, MediaError> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(img, quality),
        ImageFormat::Png => {
            let mut buf = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
            Ok(buf)
        }
        ImageFormat::WebP => encode_webp_lossless(img),
        ImageFormat::Gif | ImageFormat::Bmp => {
            let mut buf = Cursor::new(Vec::new());
            img.write_to(&mut buf, format)?;
            Ok(buf.into_inner())
        }
        other => Err(MediaError::UnsupportedImage(format!("{other:?}"))),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}

/// Lossy through ffmpeg when available; builds without libwebp fall back to lossless.
fn encode_webp(
    img: &DynamicImage,
    quality: u8,
    encoder: Option<&Path>,
) -> Result<Vec<u8>, MediaError> {
    if let Some(encoder) = encoder {
        match encode_webp_lossy(img, quality, encoder) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => debug!("optimise"; "lossy webp unavailable: {e}"),
        }
    }
    encode_webp_lossless(img)
}

/// Encode a PNG copy to WebP with `libwebp`, in a temp dir removed on drop.
fn encode_webp_lossy(img: &DynamicImage, quality: u8, encoder: &Path) -> Result<Vec<u8>, MediaError> {
    let dir = tempfile::Builder::new()
        .prefix("pubkit-webp-")
        .tempdir()
        .map_err(|e| MediaError::Io(std::env::temp_dir(), e))?;
    let input = dir.path().join("input.png");
    let output = dir.path().join("output.webp");

    img.save_with_format(&input, ImageFormat::Png)?;

    Cmd::new(encoder)
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(&input)
        .args(["-c:v", "libwebp", "-lossless", "0", "-quality", &quality.to_string()])
        .arg(&output)
        .filter(&SILENT_FILTER)
        .run()
        .map_err(|e| MediaError::EncoderFailed(format!("{e:#}")))?;

    fs::read(&output).map_err(|e| MediaError::Io(output, e))
}

/// The WebP encoder only takes 8-bit RGB(A).
fn encode_webp_lossless(img: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    img.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
    Ok(buf)
}

fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn format_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => types::PNG,
        ImageFormat::Jpeg => types::JPEG,
        ImageFormat::Gif => types::GIF,
        ImageFormat::WebP => types::WEBP,
        ImageFormat::Bmp => types::BMP,
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    /// Deterministic noise, large enough not to compress away.
    fn noise_png(width: u32, height: u32) -> Vec<u8> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let img = RgbImage::from_fn(width, height, |_, _| {
            let mut next = || {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 33) as u8
            };
            Rgb([next(), next(), next()])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                CompressionType::Fast,
                FilterType::NoFilter,
            ))
            .unwrap();
        buf
    }

    fn options() -> ImageOptions {
        ImageOptions {
            quality: 80,
            webp: false,
            max_dimension: None,
        }
    }

    #[test]
    fn test_too_small() {
        let outcome = optimise_image(&[0u8; 100], &options(), None);
        assert_eq!(outcome.status, Status::SkippedSmall);
        assert_eq!(outcome.reason.as_deref(), Some("Too small: 100 bytes"));
    }

    #[test]
    fn test_invalid() {
        let outcome = optimise_image(&[7u8; 4096], &options(), None);
        assert_eq!(outcome.status, Status::SkippedInvalid);
        assert!(outcome.optimised.is_none());
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let data = noise_png(400, 200);
        let opts = ImageOptions {
            max_dimension: Some(100),
            ..options()
        };
        let outcome = optimise_image(&data, &opts, None);
        assert_eq!(outcome.status, Status::Processed);

        let optimised = outcome.optimised.unwrap();
        assert_eq!(optimised.mime, types::PNG);
        let img = image::load_from_memory(&optimised.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (100, 50));
    }

    #[test]
    fn test_webp_when_smaller() {
        let data = noise_png(400, 200);
        let opts = ImageOptions {
            webp: true,
            max_dimension: Some(100),
            ..options()
        };
        let outcome = optimise_image(&data, &opts, None);
        assert_eq!(outcome.status, Status::ProcessedWebp);

        let optimised = outcome.optimised.unwrap();
        assert_eq!(optimised.mime, types::WEBP);
        assert_eq!(image::guess_format(&optimised.bytes).unwrap(), ImageFormat::WebP);
    }

    /// Smooth gradient saved as a near-lossless JPEG.
    fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) / 4 % 256) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 100))
            .unwrap();
        buf
    }

    #[test]
    fn test_lossy_webp_from_jpeg() {
        let Some(ffmpeg) = crate::media::audio::find_encoder("ffmpeg") else {
            return;
        };
        let data = gradient_jpeg(256, 256);
        let img = image::load_from_memory(&data).unwrap();
        // ffmpeg builds without libwebp
        if encode_webp_lossy(&img, 60, &ffmpeg).is_err() {
            return;
        }

        let opts = ImageOptions {
            quality: 60,
            webp: true,
            ..options()
        };
        let outcome = optimise_image(&data, &opts, Some(&ffmpeg));
        assert_eq!(outcome.status, Status::ProcessedWebp);

        let optimised = outcome.optimised.unwrap();
        assert_eq!(optimised.mime, types::WEBP);
        assert_eq!(image::guess_format(&optimised.bytes).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_webp_falls_back_to_lossless() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([9, 9, 9])));
        let bytes = encode_webp(&img, 80, Some(Path::new("/nonexistent/pubkit-ffmpeg"))).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(8, 8), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_png_to_jpeg_flattens_alpha() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 0]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_with_encoder(PngEncoder::new(&mut png))
            .unwrap();

        let jpeg = convert_png_to_jpeg(&png, 75).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        assert!(decoded.get_pixel(16, 16).0.iter().all(|&c| c >= 250));
    }

    #[test]
    fn test_png_to_jpeg_rejects_other_formats() {
        assert!(convert_png_to_jpeg(b"GIF89a....", 75).is_err());
    }
}
