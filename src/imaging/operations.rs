//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they turn a
//! source/destination pair plus the configured encoding levels into
//! [`ThumbnailParams`], then hand those to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodingSettings, ThumbnailParams};
use std::path::Path;

/// Describe the thumbnail for `source` written to `output`.
///
/// The encoder is chosen from the output extension, so a `.gif` source
/// planned to `.png` gets PNG compression.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    bound: u32,
    settings: &EncodingSettings,
) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        bound,
        encoding: settings.for_output(output),
    }
}

/// Plan and create a single thumbnail.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    bound: u32,
    settings: &EncodingSettings,
) -> Result<Dimensions, BackendError> {
    backend.thumbnail(&plan_thumbnail(source, output, bound, settings))
}
