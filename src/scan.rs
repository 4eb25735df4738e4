//! Scanning one recording for motion and cutting clips around each event.
//!
//! [`Scanner`] ties the pipeline together: sample frames at a fixed
//! interval, score the watched region against the previous sample, window
//! the detections, and hand each accepted event to a
//! [`ClipWriter`](crate::ClipWriter). The result is a list of
//! [`SavedClip`]s, one per accepted detection.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use motioncut::{MotioncutError, NullObserver, Region, ScanOptions, Scanner, VideoSource};
//!
//! let mut source = VideoSource::open("camera3_night.avi")?;
//! let options = ScanOptions::new(Region::new(0, 420, 180, 290)).threshold(650_000);
//! let clips = Scanner::new(options).scan(&mut source, Path::new("clips"), &NullObserver)?;
//! for clip in &clips {
//!     println!("{} ({} frames)", clip.path.display(), clip.frames);
//! }
//! # Ok::<(), MotioncutError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::clip::{ClipOptions, ClipWriter, clip_file_name};
use crate::conversion;
use crate::detect::{DetectionEvent, MotionDetector};
use crate::error::MotioncutError;
use crate::progress::{ScanEvent, ScanObserver};
use crate::region::Region;
use crate::source::VideoSource;

/// Default motion score threshold.
///
/// Tuned for a few-hundred-pixel-wide doorway region on 8-bit grayscale
/// frames; busier or larger regions usually want a higher value.
pub const DEFAULT_THRESHOLD: u64 = 500_000;

/// Options for a motion scan.
///
/// Only the watched [`Region`] is required; everything else has defaults
/// matching a typical doorway-camera setup.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    region: Region,
    threshold: u64,
    sample_interval: Duration,
    pre_roll: Duration,
    clip_duration: Duration,
}

impl ScanOptions {
    /// Scan options watching `region`, with a threshold of
    /// [`DEFAULT_THRESHOLD`], one sample per second, five seconds of
    /// pre-roll, and ten-second clips.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            threshold: DEFAULT_THRESHOLD,
            sample_interval: Duration::from_secs(1),
            pre_roll: Duration::from_secs(5),
            clip_duration: Duration::from_secs(10),
        }
    }

    /// Set the motion score threshold. A sample is a detection only when
    /// its score is strictly greater than this.
    pub fn threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the time between sample frames.
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Set how far before a detection each clip starts.
    pub fn pre_roll(mut self, pre_roll: Duration) -> Self {
        self.pre_roll = pre_roll;
        self
    }

    /// Set the clip length. Also the suppression window: a new detection
    /// whose clip would start within one clip length of an already accepted
    /// clip is dropped as part of the same event.
    pub fn clip_duration(mut self, duration: Duration) -> Self {
        self.clip_duration = duration;
        self
    }
}

/// One clip written by a scan.
#[derive(Debug, Clone)]
pub struct SavedClip {
    /// The recording the clip was cut from.
    pub source: PathBuf,
    /// Where the clip was written.
    pub path: PathBuf,
    /// The detection that produced it.
    pub event: DetectionEvent,
    /// Number of frames in the clip. May be fewer than a full clip's worth
    /// when the event sat near the end of the recording.
    pub frames: u64,
}

/// Scans recordings for motion.
///
/// Create via [`Scanner::new`], then call [`scan`](Scanner::scan) once per
/// video. A scanner is reusable: detection state is per call, so the same
/// scanner can walk a whole directory of recordings.
#[derive(Debug, Clone)]
pub struct Scanner {
    options: ScanOptions,
    clip_options: ClipOptions,
}

impl Scanner {
    /// Create a scanner with default clip encoding (MPEG-4 Part 2 in AVI).
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            clip_options: ClipOptions::new(),
        }
    }

    /// Set how clips are encoded and named.
    pub fn clip_options(mut self, options: ClipOptions) -> Self {
        self.clip_options = options;
        self
    }

    /// Scan `source` and write one clip into `output_dir` per accepted
    /// detection. Returns the clips in detection order.
    ///
    /// The watched region is clamped to the frame when it reaches past an
    /// edge. Sampling stops at the end of the recording or on the first
    /// decode failure; everything scanned up to that point still counts.
    ///
    /// # Errors
    ///
    /// - [`MotioncutError::RegionOutsideFrame`] if the region and the frame
    ///   do not overlap at all.
    /// - [`MotioncutError::InvalidInterval`] if the sample interval is zero.
    /// - [`MotioncutError::DecodeError`] if no decoder can be built for the
    ///   stream.
    /// - Clip extraction errors ([`MotioncutError::ClipEncodeError`],
    ///   [`MotioncutError::ClipWriteError`]) propagate; in a batch run the
    ///   runner logs them and moves on to the next file.
    pub fn scan(
        &self,
        source: &mut VideoSource,
        output_dir: &Path,
        observer: &dyn ScanObserver,
    ) -> Result<Vec<SavedClip>, MotioncutError> {
        let started = Instant::now();

        let metadata = source.metadata().clone();
        let source_path = source.path().to_path_buf();
        let source_stem = source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());

        let region = match self.options.region.clamp_to(metadata.width, metadata.height) {
            Some(clamped) => {
                if clamped != self.options.region {
                    log::warn!(
                        "Region {} reaches past the {}x{} frame; clamped to {}",
                        self.options.region,
                        metadata.width,
                        metadata.height,
                        clamped,
                    );
                }
                clamped
            }
            None => {
                return Err(MotioncutError::RegionOutsideFrame {
                    region: self.options.region,
                    width: metadata.width,
                    height: metadata.height,
                });
            }
        };

        std::fs::create_dir_all(output_dir)?;

        let expected_samples = conversion::expected_sample_count(
            metadata.frame_count,
            metadata.frames_per_second,
            self.options.sample_interval,
        );

        observer.on_event(&ScanEvent::VideoStarted {
            path: &source_path,
            metadata: &metadata,
            expected_samples,
        });

        let mut detector = MotionDetector::new(
            self.options.threshold,
            self.options.pre_roll,
            self.options.clip_duration,
        );
        let writer = ClipWriter::new(self.clip_options.clone());
        let extension = writer.options().effective_extension().to_string();

        let mut saved = Vec::new();

        for sample in source.sample_frames(self.options.sample_interval)? {
            observer.on_event(&ScanEvent::SampleDecoded {
                index: sample.index,
                timestamp: sample.timestamp,
                expected_samples,
            });

            let signature = region.crop(&sample.image);
            let Some(event) = detector.observe(sample.timestamp, signature) else {
                continue;
            };

            observer.on_event(&ScanEvent::MotionDetected {
                path: &source_path,
                event: &event,
            });

            let clip_path = output_dir.join(clip_file_name(
                &source_stem,
                event.clip_start,
                &extension,
            ));
            let frames = writer.extract(
                &source_path,
                event.clip_start,
                event.clip_end - event.clip_start,
                &clip_path,
            )?;

            observer.on_event(&ScanEvent::ClipSaved {
                source: &source_path,
                clip: &clip_path,
                event: &event,
                frames,
            });

            saved.push(SavedClip {
                source: source_path.clone(),
                path: clip_path,
                event,
                frames,
            });
        }

        let elapsed = started.elapsed();
        observer.on_event(&ScanEvent::VideoFinished {
            path: &source_path,
            clips: saved.len(),
            elapsed,
        });

        log::info!(
            "Scanned {} in {:.1}s: {} clip(s)",
            source_path.display(),
            elapsed.as_secs_f64(),
            saved.len(),
        );

        Ok(saved)
    }
}
