//! Image processing: decode, bounding-box scale, format-dispatched encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with the format chosen by source extension |
//! | **Scale** | `DynamicImage::resize_exact` with `Lanczos3` |
//! | **Encode JPEG / PNG** | `image` crate encoders |
//! | **Encode WebP** | `webp` crate (lossy) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a thumbnail operation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::scaled_dimensions;
pub use operations::{create_thumbnail, plan_thumbnail};
pub use params::{Encoding, EncodingSettings, PngCompression, ThumbnailParams, webp_native_quality};
pub use rust_backend::RustBackend;
