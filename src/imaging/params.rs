//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what images to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`EncodingSettings`]: Per-format quality levels as configured.
//! - [`Encoding`]: The encoder and level chosen for one output file.
//! - [`PngCompression`]: PNG encoder preset for a 0–9 compression level.
//! - [`ThumbnailParams`]: Full specification for a thumbnail: source, output, bound, encoding.

use crate::config::ThumbnailConfig;
use std::path::{Path, PathBuf};

/// Quality levels for each output format, as written in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingSettings {
    /// 0–100.
    pub jpeg_quality: u8,
    /// 0–9.
    pub webp_quality: u8,
    /// 0–9.
    pub png_compression: u8,
}

impl EncodingSettings {
    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            webp_quality: config.webp_quality,
            png_compression: config.png_compression,
        }
    }

    /// Pick the encoder for an output path by its extension.
    ///
    /// `jpg`/`jpeg` → JPEG, `webp` → lossy WebP, anything else → PNG.
    pub fn for_output(&self, output: &Path) -> Encoding {
        let ext = output
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" => Encoding::Jpeg {
                quality: self.jpeg_quality,
            },
            "webp" => Encoding::WebP {
                quality: webp_native_quality(self.webp_quality),
            },
            _ => Encoding::Png {
                compression: PngCompression::from_level(self.png_compression),
            },
        }
    }
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            webp_quality: 8,
            png_compression: 6,
        }
    }
}

/// Map a 0–9 WebP level onto the codec's 0–100 quality scale.
pub fn webp_native_quality(level: u8) -> f32 {
    f32::from(level.min(9)) * 100.0 / 9.0
}

/// PNG encoder preset. Compression never changes pixels, only size and speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// 0–2 → fast, 3–6 → default, 7–9 → best.
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=2 => PngCompression::Fast,
            3..=6 => PngCompression::Default,
            _ => PngCompression::Best,
        }
    }
}

/// Encoder and level for one output file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    Jpeg { quality: u8 },
    WebP { quality: f32 },
    Png { compression: PngCompression },
}

/// Parameters for a thumbnail operation (decode + bounding-box scale + encode).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Longer edge of the result.
    pub bound: u32,
    pub encoding: Encoding,
}
