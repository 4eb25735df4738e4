//! Error types for the `motioncut` crate.
//!
//! This module defines [`MotioncutError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose a failure per file, which matters in batch runs where one bad
//! recording must not take down the rest of the night's footage.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

use crate::region::Region;

/// The unified error type for all `motioncut` operations.
///
/// Every public method that can fail returns `Result<T, MotioncutError>`.
/// End-of-stream conditions are deliberately *not* errors: sampling and clip
/// extraction treat stream exhaustion as normal termination, so none of these
/// variants is produced for a video that simply ends early.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MotioncutError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The video stream exists but cannot be scanned (for example, it
    /// reports no usable frame rate).
    #[error("Unsupported video stream: {0}")]
    UnsupportedVideo(String),

    /// A decoder or scaler could not be constructed for the video stream.
    #[error("Failed to set up video decoding: {0}")]
    DecodeError(String),

    /// A region string or value could not be parsed.
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// The detection region lies entirely outside the frame.
    #[error("Region {region} is outside the {width}x{height} frame")]
    RegionOutsideFrame {
        /// The configured detection region.
        region: Region,
        /// Width of the video frame.
        width: u32,
        /// Height of the video frame.
        height: u32,
    },

    /// A sampling interval or clip duration of zero was provided.
    #[error("Interval must be greater than zero")]
    InvalidInterval,

    /// Clip encoding failed (encoder setup or frame submission).
    #[error("Failed to encode clip: {0}")]
    ClipEncodeError(String),

    /// A clip file could not be written (muxer setup, header, or trailer).
    #[error("Failed to write clip: {0}")]
    ClipWriteError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl From<FfmpegError> for MotioncutError {
    fn from(error: FfmpegError) -> Self {
        MotioncutError::FfmpegError(error.to_string())
    }
}
