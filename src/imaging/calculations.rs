//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` into a `bound` × `bound` box, preserving aspect ratio.
///
/// The longer edge becomes exactly `bound`; the shorter edge is scaled by
/// the same ratio and rounded. Neither edge drops below one pixel. Sources
/// smaller than the box are scaled up.
///
/// # Examples
/// ```
/// # use yogurt_thumbs::imaging::scaled_dimensions;
/// assert_eq!(scaled_dimensions((200, 100), 100), (100, 50));
/// assert_eq!(scaled_dimensions((100, 200), 100), (50, 100));
/// assert_eq!(scaled_dimensions((100, 100), 100), (100, 100));
/// ```
pub fn scaled_dimensions(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (src_w, src_h) = source;

    let mut ratio_x = 1.0;
    let mut ratio_y = 1.0;
    if src_w < src_h {
        ratio_x = src_w as f64 / src_h as f64;
    } else if src_h < src_w {
        ratio_y = src_h as f64 / src_w as f64;
    }

    let width = (bound as f64 * ratio_x).round().max(1.0) as u32;
    let height = (bound as f64 * ratio_y).round().max(1.0) as u32;
    (width, height)
}
