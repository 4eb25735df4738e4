//! Batch scanning a directory of recordings.
//!
//! [`BatchRunner`] walks an input directory, scans every video with a
//! matching extension in file-name order, and collects the results into a
//! [`BatchSummary`]. A file that fails to open or scan is reported and
//! skipped; overnight runs over a camera archive should not die on one
//! corrupt recording.
//!
//! # Example
//!
//! ```no_run
//! use motioncut::{BatchRunner, MotioncutError, NullObserver, Region, ScanOptions};
//!
//! let options = ScanOptions::new(Region::new(0, 420, 180, 290));
//! let summary = BatchRunner::new("recordings", "recordings/clips", options)
//!     .run(&NullObserver)?;
//! println!(
//!     "{} of {} videos scanned, {} clip(s)",
//!     summary.videos_scanned,
//!     summary.videos_found,
//!     summary.clips.len(),
//! );
//! # Ok::<(), MotioncutError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::clip::ClipOptions;
use crate::error::MotioncutError;
use crate::progress::{ScanEvent, ScanObserver};
use crate::scan::{SavedClip, ScanOptions, Scanner};
use crate::source::VideoSource;

/// What a batch run found and produced.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Videos with a matching extension in the input directory.
    pub videos_found: usize,
    /// Videos scanned to completion.
    pub videos_scanned: usize,
    /// Videos skipped because they failed to open or scan.
    pub videos_failed: usize,
    /// Every clip written, across all videos, in scan order.
    pub clips: Vec<SavedClip>,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// Scans a directory of recordings.
///
/// Create via [`BatchRunner::new`], adjust with the builder methods, then
/// call [`run`](BatchRunner::run).
#[derive(Debug, Clone)]
pub struct BatchRunner {
    input_dir: PathBuf,
    output_dir: PathBuf,
    extension: String,
    scanner: Scanner,
}

impl BatchRunner {
    /// A runner that scans `input_dir` for `.avi` files and writes clips
    /// into `output_dir`.
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_dir: P1,
        output_dir: P2,
        options: ScanOptions,
    ) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            extension: "avi".to_string(),
            scanner: Scanner::new(options),
        }
    }

    /// Set the file extension to scan for (compared case-insensitively,
    /// with or without a leading dot).
    pub fn extension<S: Into<String>>(mut self, extension: S) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set how clips are encoded and named.
    pub fn clip_options(mut self, options: ClipOptions) -> Self {
        self.scanner = self.scanner.clip_options(options);
        self
    }

    /// The videos a run would scan: regular files in the input directory
    /// with the configured extension, sorted by file name so repeated runs
    /// visit them in the same order.
    ///
    /// # Errors
    ///
    /// [`MotioncutError::IoError`] if the input directory cannot be read.
    pub fn collect_videos(&self) -> Result<Vec<PathBuf>, MotioncutError> {
        let mut videos = Vec::new();
        for entry in std::fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .is_some_and(|extension| extension.eq_ignore_ascii_case(self.extension.as_str()));
            if matches {
                videos.push(path);
            }
        }
        videos.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(videos)
    }

    /// Scan every matching video, skipping files that fail.
    ///
    /// The output directory is created up front, so it exists even when
    /// the input directory holds no matching videos. A file that fails to
    /// open or scan is reported as [`ScanEvent::VideoFailed`], logged, and
    /// skipped; the run continues with the next file.
    ///
    /// # Errors
    ///
    /// Only directory-level failures abort the run: the input directory
    /// not being readable, or the output directory not being creatable.
    pub fn run(&self, observer: &dyn ScanObserver) -> Result<BatchSummary, MotioncutError> {
        let started = Instant::now();

        std::fs::create_dir_all(&self.output_dir)?;
        let videos = self.collect_videos()?;

        if videos.is_empty() {
            log::warn!(
                "No .{} files found in {}",
                self.extension,
                self.input_dir.display(),
            );
            return Ok(BatchSummary {
                videos_found: 0,
                videos_scanned: 0,
                videos_failed: 0,
                clips: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        log::info!(
            "Scanning {} video(s) in {}",
            videos.len(),
            self.input_dir.display(),
        );

        let mut scanned = 0usize;
        let mut failed = 0usize;
        let mut clips = Vec::new();

        for path in &videos {
            let path = path.as_path();
            match self.scan_one(path, observer) {
                Ok(mut saved) => {
                    scanned += 1;
                    clips.append(&mut saved);
                }
                Err(error) => {
                    failed += 1;
                    log::error!("Skipping {}: {error}", path.display());
                    observer.on_event(&ScanEvent::VideoFailed {
                        path,
                        error: &error,
                    });
                }
            }
        }

        Ok(BatchSummary {
            videos_found: videos.len(),
            videos_scanned: scanned,
            videos_failed: failed,
            clips,
            elapsed: started.elapsed(),
        })
    }

    fn scan_one(
        &self,
        path: &Path,
        observer: &dyn ScanObserver,
    ) -> Result<Vec<SavedClip>, MotioncutError> {
        let mut source = VideoSource::open(path)?;
        self.scanner.scan(&mut source, &self.output_dir, observer)
    }
}
