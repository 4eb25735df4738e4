//! Motion scoring between consecutive region signatures.
//!
//! The score is the sum of absolute per-pixel intensity differences between
//! the current signature and the previous one, accumulated in `u64` so the
//! 8-bit subtraction can never wrap. There is no normalization by area and
//! no per-pixel thresholding, just "how much did this rectangle change since
//! the last sample"; the threshold is tuned to the watched region's size.

use image::GrayImage;

/// Sum of absolute per-pixel differences between two equally-sized
/// grayscale images.
///
/// Both signatures come from the same clamped region of the same video, so
/// they always share dimensions; if they ever did not, the zip truncates to
/// the shorter buffer.
///
/// # Example
///
/// ```
/// use image::{GrayImage, Luma};
/// use motioncut::motion_score;
///
/// let dark = GrayImage::from_pixel(4, 4, Luma([10]));
/// let bright = GrayImage::from_pixel(4, 4, Luma([200]));
/// assert_eq!(motion_score(&bright, &dark), 16 * 190);
/// assert_eq!(motion_score(&dark, &dark), 0);
/// ```
pub fn motion_score(current: &GrayImage, previous: &GrayImage) -> u64 {
    debug_assert_eq!(current.dimensions(), previous.dimensions());
    current
        .as_raw()
        .iter()
        .zip(previous.as_raw())
        .map(|(&a, &b)| u64::from(a.abs_diff(b)))
        .sum()
}
