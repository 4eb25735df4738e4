//! Motion event detection and window suppression.
//!
//! Two layers live here. [`EventWindower`] is the pure decision rule: it
//! consumes `(timestamp, score)` pairs, applies the threshold, and turns
//! survivors into fixed-length clip windows while suppressing windows that
//! start too close to one already accepted. [`MotionDetector`] wraps it with
//! the per-video signature state: it keeps exactly one previous region
//! signature, scores each new sample against it, and feeds the windower.
//!
//! Both are created fresh for every video; nothing detection-related
//! survives from one recording to the next.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use motioncut::EventWindower;
//!
//! let mut windower = EventWindower::new(
//!     500_000,
//!     Duration::from_secs(5),
//!     Duration::from_secs(10),
//! );
//!
//! // Score above threshold at t=12s: window [7s, 17s).
//! let event = windower.consider(Duration::from_secs(12), 600_000).unwrap();
//! assert_eq!(event.clip_start, Duration::from_secs(7));
//!
//! // A second burst 3 seconds later folds into the same window.
//! assert!(windower.consider(Duration::from_secs(15), 900_000).is_none());
//! ```

use std::time::Duration;

use image::GrayImage;

use crate::score::motion_score;

/// An accepted motion event and the clip window planned around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    /// Timestamp of the sample whose score crossed the threshold.
    pub detection_time: Duration,
    /// Start of the clip window: `detection_time` minus the pre-roll,
    /// clamped at the start of the video.
    pub clip_start: Duration,
    /// End of the clip window: `clip_start` plus the clip duration. Never
    /// clamped; a window may extend past the end of a short recording, in
    /// which case extraction simply writes fewer frames.
    pub clip_end: Duration,
    /// The motion score that triggered the event.
    pub score: u64,
}

/// Threshold and overlap-suppression rule for candidate motion events.
///
/// Windows are never merged or extended: every accepted event spans exactly
/// one clip duration, and a candidate whose start lies strictly within one
/// clip duration of *any* accepted start is dropped. A burst of motion
/// therefore collapses to the first window that saw it.
#[derive(Debug, Clone)]
pub struct EventWindower {
    threshold: u64,
    pre_roll: Duration,
    clip_duration: Duration,
    accepted_starts: Vec<Duration>,
}

impl EventWindower {
    /// Create a windower.
    ///
    /// `threshold` is compared with strict `>`; `pre_roll` is how far the
    /// window reaches back before the detection; `clip_duration` is both the
    /// window length and the suppression distance.
    pub fn new(threshold: u64, pre_roll: Duration, clip_duration: Duration) -> Self {
        Self {
            threshold,
            pre_roll,
            clip_duration,
            accepted_starts: Vec::new(),
        }
    }

    /// Consider one scored sample; returns the accepted event, if any.
    ///
    /// Emits iff `score > threshold` and no previously accepted window
    /// starts within one clip duration of the candidate's start. Suppressed
    /// candidates leave no trace: they are neither emitted nor recorded, so
    /// they cannot themselves suppress later candidates.
    pub fn consider(&mut self, detection_time: Duration, score: u64) -> Option<DetectionEvent> {
        if score <= self.threshold {
            return None;
        }

        let clip_start = detection_time.saturating_sub(self.pre_roll);

        // Linear scan over every accepted start. O(n) per candidate, which
        // is fine at one candidate per sample and a handful of accepted
        // windows per recording.
        let suppressed = self
            .accepted_starts
            .iter()
            .any(|&start| abs_difference(start, clip_start) < self.clip_duration);
        if suppressed {
            log::debug!(
                "Suppressed candidate at {:.1}s (window start {:.1}s overlaps an accepted clip)",
                detection_time.as_secs_f64(),
                clip_start.as_secs_f64()
            );
            return None;
        }

        self.accepted_starts.push(clip_start);
        Some(DetectionEvent {
            detection_time,
            clip_start,
            clip_end: clip_start + self.clip_duration,
            score,
        })
    }

    /// Number of events accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted_starts.len()
    }
}

/// Per-video detection state: the single-slot previous signature plus the
/// windower.
///
/// The previous signature is exactly one image deep. Each observed sample is
/// scored against it (except the first, which has nothing to compare with)
/// and then replaces it.
#[derive(Debug)]
pub struct MotionDetector {
    previous: Option<GrayImage>,
    windower: EventWindower,
}

impl MotionDetector {
    /// Create a detector with fresh state. Parameters as in
    /// [`EventWindower::new`].
    pub fn new(threshold: u64, pre_roll: Duration, clip_duration: Duration) -> Self {
        Self {
            previous: None,
            windower: EventWindower::new(threshold, pre_roll, clip_duration),
        }
    }

    /// Observe one region signature at the given timestamp.
    ///
    /// The very first sample of a video never produces an event; it only
    /// seeds the comparison slot.
    pub fn observe(&mut self, timestamp: Duration, signature: GrayImage) -> Option<DetectionEvent> {
        let score = self
            .previous
            .as_ref()
            .map(|previous| motion_score(&signature, previous));
        self.previous = Some(signature);

        let score = score?;
        log::debug!("Sample at {:.1}s scored {score}", timestamp.as_secs_f64());
        self.windower.consider(timestamp, score)
    }

    /// Drop all per-video state, returning the detector to the condition it
    /// had before the first sample.
    pub fn reset(&mut self) {
        self.previous = None;
        self.windower.accepted_starts.clear();
    }
}

fn abs_difference(a: Duration, b: Duration) -> Duration {
    if a > b { a - b } else { b - a }
}
