//! Shared test utilities for the yogurt-thumbs test suite.
//!
//! Synthetic image writers and a small gallery builder so tests never depend
//! on checked-in binary fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_test_image(&tmp.path().join("japan/a.jpg"), 200, 100);
//! write_corrupt_file(&tmp.path().join("japan/broken.jpg"));
//! let catalog = write_catalog_file(tmp.path(), &["japan/a.jpg", "japan/broken.jpg"]);
//! let config = thumbnail_config(&catalog, "thumb");
//! ```

use crate::catalog::{Catalog, write_catalog};
use crate::config::ThumbnailConfig;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient image, encoded by the path's extension.
///
/// JPEG gets an RGB image; every other format gets RGBA with a
/// semi-transparent half so alpha handling can be checked.
pub fn write_test_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    let img = if is_jpeg {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    } else {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            let alpha = if x < width / 2 { 255 } else { 96 };
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, alpha])
        }))
    };
    img.save(path).unwrap();
}

/// Write bytes that no decoder accepts, under an image file name.
pub fn write_corrupt_file(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"this is not an image").unwrap();
}

// =========================================================================
// Pipeline fixtures
// =========================================================================

/// Write `db.json` under `root` listing `paths` in order; returns its path.
pub fn write_catalog_file(root: &Path, paths: &[&str]) -> PathBuf {
    let catalog_path = root.join("db.json");
    let catalog = Catalog::new(paths.iter().map(|p| p.to_string()).collect());
    write_catalog(&catalog_path, &catalog).unwrap();
    catalog_path
}

/// Thumbnail config with default quality settings.
pub fn thumbnail_config(catalog_path: &Path, thumbnail_dir: &str) -> ThumbnailConfig {
    ThumbnailConfig {
        catalog_path: catalog_path.to_string_lossy().replace('\\', "/"),
        thumbnail_dir: format!("{thumbnail_dir}/"),
        thumbnail_size: 100,
        jpeg_quality: 75,
        webp_quality: 8,
        png_compression: 6,
        max_workers: 2,
    }
}
