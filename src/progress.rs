//! Scan progress reporting.
//!
//! This module provides [`ScanObserver`] for monitoring a scan as it walks a
//! recording, and [`ScanEvent`] describing what just happened. Observers see
//! every stage of the pipeline: a video being opened, each sample decoded,
//! motion detected, clips written, and per-file success or failure.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use motioncut::{ScanEvent, ScanObserver};
//!
//! #[derive(Default)]
//! struct ClipCounter {
//!     clips: AtomicUsize,
//! }
//!
//! impl ScanObserver for ClipCounter {
//!     fn on_event(&self, event: &ScanEvent<'_>) {
//!         if let ScanEvent::ClipSaved { .. } = event {
//!             self.clips.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use crate::detect::DetectionEvent;
use crate::error::MotioncutError;
use crate::metadata::VideoMetadata;

/// A notification from a running scan.
///
/// Borrowed payloads keep event delivery allocation-free; observers that
/// need to retain data clone what they keep.
#[derive(Debug)]
#[non_exhaustive]
pub enum ScanEvent<'a> {
    /// A video was opened and its scan is about to start.
    VideoStarted {
        /// The file being scanned.
        path: &'a Path,
        /// Metadata of the opened source.
        metadata: &'a VideoMetadata,
        /// How many samples the scan expects to decode, when the container
        /// reported a duration.
        expected_samples: Option<u64>,
    },
    /// One sample frame was decoded and scored.
    SampleDecoded {
        /// Sample index `i` (0, 1, 2, …).
        index: u64,
        /// Timestamp of the sample within the recording.
        timestamp: Duration,
        /// Expected sample count, when known.
        expected_samples: Option<u64>,
    },
    /// A sample's motion score crossed the threshold and was accepted as an
    /// event. Emitted before clip extraction begins, which may take a
    /// moment on its own.
    MotionDetected {
        /// The file being scanned.
        path: &'a Path,
        /// The accepted detection.
        event: &'a DetectionEvent,
    },
    /// A clip for an accepted detection was written out.
    ClipSaved {
        /// The recording the clip was cut from.
        source: &'a Path,
        /// Where the clip was written.
        clip: &'a Path,
        /// The detection that produced it.
        event: &'a DetectionEvent,
        /// Number of frames in the clip.
        frames: u64,
    },
    /// A video's scan ran to completion.
    VideoFinished {
        /// The file that was scanned.
        path: &'a Path,
        /// Number of clips written for this video.
        clips: usize,
        /// Wall-clock time the scan took.
        elapsed: Duration,
    },
    /// A video could not be scanned. Batch runs report the failure and
    /// move on to the next file.
    VideoFailed {
        /// The file that failed.
        path: &'a Path,
        /// Why it failed.
        error: &'a MotioncutError,
    },
}

/// Trait for receiving scan notifications.
///
/// Implementations must be [`Send`] and [`Sync`] so an observer can be
/// shared with whatever thread drives the scan.
///
/// Observers are **infallible** — they watch the scan but cannot halt it.
pub trait ScanObserver: Send + Sync {
    /// Called once per [`ScanEvent`], in pipeline order.
    fn on_event(&self, event: &ScanEvent<'_>);
}

/// An observer that discards all notifications.
///
/// Useful when calling [`Scanner::scan`](crate::Scanner::scan) or
/// [`BatchRunner::run`](crate::BatchRunner::run) without a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ScanObserver for NullObserver {
    fn on_event(&self, _event: &ScanEvent<'_>) {}
}
