//! Opening video sources.
//!
//! [`VideoSource`] is the entry point for a single recording: it opens the
//! file, locates the best video stream, and caches [`VideoMetadata`] for the
//! lifetime of the source. Scanning borrows the source mutably through
//! [`FrameSampler`](crate::FrameSampler); clip extraction deliberately does
//! *not* reuse this handle (it opens its own, see [`crate::ClipWriter`]), so
//! a source's read position belongs to the sampler alone.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational, Stream, codec::context::Context as CodecContext, format::context::Input, media::Type,
};

use crate::{error::MotioncutError, metadata::VideoMetadata};

/// An opened source recording.
///
/// Created via [`VideoSource::open`]. Holds the demuxer context and cached
/// metadata; dropping it closes the file on every exit path.
///
/// # Example
///
/// ```no_run
/// use motioncut::{MotioncutError, VideoSource};
///
/// let source = VideoSource::open("camera3_night.avi")?;
/// println!("{:.1}s of footage", source.metadata().duration.as_secs_f64());
/// # Ok::<(), MotioncutError>(())
/// ```
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Index of the best video stream.
    pub(crate) stream_index: usize,
    /// Cached metadata extracted at open time.
    metadata: VideoMetadata,
    /// Path to the opened file (kept for clip extraction and messages).
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for scanning.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`MotioncutError::FileOpen`] if the file cannot be opened or its
    ///   codec parameters cannot be read.
    /// - [`MotioncutError::NoVideoStream`] if no video stream exists.
    /// - [`MotioncutError::UnsupportedVideo`] if the stream reports no
    ///   usable frame rate, which the sample arithmetic depends on.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MotioncutError> {
        let path = path.as_ref();
        let source_path = path.to_path_buf();

        log::debug!("Opening video file: {}", source_path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| MotioncutError::FileOpen {
            path: source_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| MotioncutError::FileOpen {
                path: source_path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(MotioncutError::NoVideoStream)?;
        let stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| MotioncutError::FileOpen {
                path: source_path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            },
        )?;
        let video_decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| MotioncutError::FileOpen {
                    path: source_path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let width = video_decoder.width();
        let height = video_decoder.height();
        let codec = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let frames_per_second = stream_frame_rate(&stream)
            .map(|rate| rate.numerator() as f64 / rate.denominator() as f64)
            .unwrap_or(0.0);
        if frames_per_second <= 0.0 {
            return Err(MotioncutError::UnsupportedVideo(
                "stream reports no frame rate".to_string(),
            ));
        }

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };
        let frame_count = (duration.as_secs_f64() * frames_per_second) as u64;

        let format = input_context.format().name().to_string();

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            format,
            codec,
        };

        log::info!(
            "Opened {} (format={}, {}x{}, {:.2} fps, {:.2}s, ~{} frames, codec={})",
            source_path.display(),
            metadata.format,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.duration.as_secs_f64(),
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            stream_index,
            metadata,
            path: source_path,
        })
    }

    /// Get a reference to the cached metadata.
    ///
    /// Extracted once during [`open`](VideoSource::open); reading it never
    /// touches the demuxer again.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Frame rate of a video stream, preferring the container's average frame
/// rate and falling back to the raw rate field. `None` when neither is
/// populated, which leaves the stream unusable for time arithmetic.
pub(crate) fn stream_frame_rate(stream: &Stream<'_>) -> Option<Rational> {
    let average = stream.avg_frame_rate();
    if average.numerator() != 0 && average.denominator() != 0 {
        return Some(average);
    }
    let rate = stream.rate();
    if rate.numerator() != 0 && rate.denominator() != 0 {
        return Some(rate);
    }
    None
}
