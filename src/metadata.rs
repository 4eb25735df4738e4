//! Video metadata types.
//!
//! This module defines [`VideoMetadata`], the per-source description returned
//! by [`VideoSource::metadata`](crate::VideoSource::metadata). Metadata is
//! extracted once when the file is opened and cached for the lifetime of the
//! source, so the scan loop never re-queries the demuxer for it.

use std::time::Duration;

/// Metadata for the video stream of an opened source.
///
/// The scanner only cares about the video stream; sources without one are
/// rejected at open time, so every field here is always populated.
///
/// # Example
///
/// ```no_run
/// use motioncut::VideoSource;
///
/// let source = VideoSource::open("camera3_night.avi").unwrap();
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// println!("Duration: {:?}", metadata.duration);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame
    /// rate. `0` when the container reports no duration; sampling then runs
    /// until decode exhaustion.
    pub frame_count: u64,
    /// Total duration of the recording.
    pub duration: Duration,
    /// Container format name (e.g. `"avi"`, `"mp4"`, `"matroska"`).
    pub format: String,
    /// Codec name (e.g. `"mpeg4"`, `"h264"`).
    pub codec: String,
}
