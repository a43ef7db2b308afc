//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, WebP) | `image` crate, format picked from the extension |
//! | Scale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (adaptive filter) |
//! | Encode → WebP | `webp::Encoder` (lossy) |
//!
//! Alpha survives into PNG and WebP output. JPEG has no alpha channel, so the
//! channel is dropped.
//!
//! Every encoder writes into memory first. The output file is only created
//! once encoding has succeeded, so a failed file leaves nothing behind.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::scaled_dimensions;
use super::params::{Encoding, PngCompression, ThumbnailParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::path::Path;

/// Source extensions and the decoder used for each.
const SOURCE_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("webp", ImageFormat::WebP),
];

/// Pure Rust backend using the `image` and `webp` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder for a source path, chosen by its extension.
fn source_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    SOURCE_FORMATS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let format = source_format(path)?;
    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    reader
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
}

/// Fit an image into a `bound` × `bound` box.
fn scale_image(img: &DynamicImage, bound: u32) -> DynamicImage {
    let (width, height) = scaled_dimensions((img.width(), img.height()), bound);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

fn save_image(img: &DynamicImage, path: &Path, encoding: Encoding) -> Result<(), BackendError> {
    match encoding {
        Encoding::Jpeg { quality } => save_jpeg(img, path, quality),
        Encoding::WebP { quality } => save_webp(img, path, quality),
        Encoding::Png { compression } => save_png(img, path, compression),
    }
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let mut buffer = Vec::new();
    // JPEG quality starts at 1.
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG {}: {}", path.display(), e)))?;
    fs::write(path, &buffer)?;
    Ok(())
}

fn save_png(
    img: &DynamicImage,
    path: &Path,
    compression: PngCompression,
) -> Result<(), BackendError> {
    let mut buffer = Vec::new();
    let compression = match compression {
        PngCompression::Fast => png::CompressionType::Fast,
        PngCompression::Default => png::CompressionType::Default,
        PngCompression::Best => png::CompressionType::Best,
    };
    let encoder = PngEncoder::new_with_quality(&mut buffer, compression, png::FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("PNG {}: {}", path.display(), e)))?;
    fs::write(path, &buffer)?;
    Ok(())
}

fn save_webp(img: &DynamicImage, path: &Path, quality: f32) -> Result<(), BackendError> {
    let (width, height) = (img.width(), img.height());
    // libwebp rejects some inputs (e.g. edges over 16383px); `encode` would panic on those.
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, quality)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
    }
    .map_err(|e| BackendError::Encode(format!("WebP {}: {:?}", path.display(), e)))?;
    fs::write(path, &*encoded)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let scaled = scale_image(&img, params.bound);
        save_image(&scaled, &params.output, params.encoding)?;
        Ok(Dimensions {
            width: scaled.width(),
            height: scaled.height(),
        })
    }
}
