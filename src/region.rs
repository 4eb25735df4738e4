//! Detection region (ROI) handling.
//!
//! Motion is evaluated inside one fixed rectangle of the frame, typically
//! picked once with an external calibration tool and then passed to every
//! scan as plain numbers. [`Region`] carries those four numbers, parses the
//! CLI spellings, and produces the grayscale signature crop for each sampled
//! frame.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, imageops};

use crate::error::MotioncutError;

/// A rectangle in source-frame pixel coordinates.
///
/// Two spellings parse: `X,Y,WxH` and `X,Y,W,H`.
///
/// # Example
///
/// ```
/// use motioncut::Region;
///
/// let region: Region = "0,420,180x290".parse().unwrap();
/// assert_eq!(region, Region::new(0, 420, 180, 290));
/// assert_eq!(region.area(), 180 * 290);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge, in pixels from the left of the frame.
    pub x: u32,
    /// Top edge, in pixels from the top of the frame.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Create a region from its four coordinates.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the region.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Intersect the region with a `frame_width` x `frame_height` frame.
    ///
    /// Returns the (possibly smaller) region that lies inside the frame, or
    /// `None` when the intersection is empty. Calibration numbers are often
    /// taken from one camera and applied to a folder with mixed resolutions,
    /// so the scan clamps once per video instead of trusting the input.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Region::new(self.x, self.y, width, height))
    }

    /// Crop the region out of a grayscale frame.
    ///
    /// The caller is expected to have clamped the region to the frame first;
    /// the underlying crop truncates anything that still hangs over the edge
    /// rather than panicking.
    pub fn crop(&self, frame: &GrayImage) -> GrayImage {
        imageops::crop_imm(frame, self.x, self.y, self.width, self.height).to_image()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}x{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Region {
    type Err = MotioncutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotioncutError::InvalidRegion(format!("expected X,Y,WxH or X,Y,W,H, got {s:?}"));

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let (x, y, width, height) = match parts.as_slice() {
            [x, y, size] => {
                let (width, height) = size.split_once(['x', 'X']).ok_or_else(invalid)?;
                (*x, *y, width.trim(), height.trim())
            }
            [x, y, width, height] => (*x, *y, *width, *height),
            _ => return Err(invalid()),
        };

        let parse = |value: &str| value.parse::<u32>().map_err(|_| invalid());
        let region = Region::new(parse(x)?, parse(y)?, parse(width)?, parse(height)?);
        if region.width == 0 || region.height == 0 {
            return Err(MotioncutError::InvalidRegion(format!(
                "region {region} has no area"
            )));
        }
        Ok(region)
    }
}
