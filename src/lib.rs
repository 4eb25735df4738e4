//! # motioncut
//!
//! Scan archival security footage for motion and cut short clips around
//! each event.
//!
//! `motioncut` walks a recording one sample frame per second (configurable),
//! scores a watched region of each frame against the previous sample, and
//! cuts a clip around every score spike — with a few seconds of pre-roll so
//! the motion is seen arriving, not already in frame. Decoding and encoding
//! are powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Scan One Recording
//!
//! ```no_run
//! use std::path::Path;
//!
//! use motioncut::{NullObserver, Region, ScanOptions, Scanner, VideoSource};
//!
//! let mut source = VideoSource::open("camera3_night.avi").unwrap();
//! let scanner = Scanner::new(ScanOptions::new(Region::new(0, 420, 180, 290)));
//! let clips = scanner
//!     .scan(&mut source, Path::new("clips"), &NullObserver)
//!     .unwrap();
//! println!("{} clip(s)", clips.len());
//! ```
//!
//! ### Scan a Directory
//!
//! ```no_run
//! use motioncut::{BatchRunner, NullObserver, Region, ScanOptions};
//!
//! let options = ScanOptions::new(Region::new(0, 420, 180, 290));
//! let summary = BatchRunner::new("recordings", "recordings/clips", options)
//!     .run(&NullObserver)
//!     .unwrap();
//! println!(
//!     "{} of {} videos scanned, {} clip(s)",
//!     summary.videos_scanned,
//!     summary.videos_found,
//!     summary.clips.len(),
//! );
//! ```
//!
//! ### Inspect a Recording
//!
//! ```no_run
//! use motioncut::VideoSource;
//!
//! let source = VideoSource::open("camera3_night.avi").unwrap();
//! let metadata = source.metadata();
//! println!(
//!     "{}x{} @ {:.2} fps, {:.1}s",
//!     metadata.width,
//!     metadata.height,
//!     metadata.frames_per_second,
//!     metadata.duration.as_secs_f64(),
//! );
//! ```
//!
//! ## Features
//!
//! - **Interval sampling** — decode one frame per sample point by seeking,
//!   instead of grinding through every frame of an hours-long recording
//! - **Region scoring** — sum of absolute per-pixel grayscale differences
//!   over a watched region, robust against whole-frame exposure shifts
//! - **Event windowing** — one clip per event: detections whose clip would
//!   overlap an accepted clip's window are suppressed
//! - **Pre-roll clips** — clips start a few seconds before the detection,
//!   clamped at the start of the recording
//! - **Re-encoded cuts** — exact clip boundaries regardless of source
//!   keyframe placement; MPEG-4/AVI by default, H.264/H.265 optional
//! - **Batch runs** — scan a directory in deterministic order, skipping
//!   files that fail instead of dying on them
//! - **Progress observation** — a [`ScanObserver`] sees every stage of the
//!   pipeline, from samples decoded to clips saved
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system; see the
//! README for platform-specific instructions.

pub mod batch;
pub mod clip;
pub mod conversion;
pub mod detect;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
pub mod region;
pub mod sampler;
pub mod scan;
pub mod score;
pub mod source;

pub use batch::{BatchRunner, BatchSummary};
pub use clip::{ClipCodec, ClipOptions, ClipWriter, clip_file_name};
pub use detect::{DetectionEvent, EventWindower, MotionDetector};
pub use error::MotioncutError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use progress::{NullObserver, ScanEvent, ScanObserver};
pub use region::Region;
pub use sampler::{FrameSampler, SampledFrame};
pub use scan::{DEFAULT_THRESHOLD, SavedClip, ScanOptions, Scanner};
pub use score::motion_score;
pub use source::VideoSource;
