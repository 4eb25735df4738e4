//! End-to-end scans over synthesized footage.
//!
//! Each test writes its own small MPEG-4/AVI fixture (see `common`), scans
//! it, and checks the clips that come out. Tests skip when the MPEG-4
//! encoder is unavailable on the platform.

mod common;

use std::sync::Mutex;
use std::time::Duration;

use motioncut::{
    MotioncutError, NullObserver, Region, ScanEvent, ScanObserver, ScanOptions, Scanner,
    VideoSource,
};

struct RecordingObserver {
    labels: Mutex<Vec<&'static str>>,
}

impl RecordingObserver {
    fn new() -> Self {
        Self {
            labels: Mutex::new(Vec::new()),
        }
    }
}

impl ScanObserver for RecordingObserver {
    fn on_event(&self, event: &ScanEvent<'_>) {
        let label = match event {
            ScanEvent::VideoStarted { .. } => "started",
            ScanEvent::SampleDecoded { .. } => "sample",
            ScanEvent::MotionDetected { .. } => "motion",
            ScanEvent::ClipSaved { .. } => "clip",
            ScanEvent::VideoFinished { .. } => "finished",
            ScanEvent::VideoFailed { .. } => "failed",
            _ => "other",
        };
        self.labels.lock().unwrap().push(label);
    }
}

#[test]
fn scan_cuts_one_clip_per_event() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("lot_east.avi");
    // Motion during frames [150, 180): the square appears at the 5s sample
    // and is gone again by the 6s sample.
    if let Err(reason) = common::synthesize_footage(&video, 450, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let clips_dir = dir.path().join("clips");
    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let scanner = Scanner::new(ScanOptions::new(common::motion_region()));
    let clips = scanner
        .scan(&mut source, &clips_dir, &NullObserver)
        .expect("scan");

    // The square appearing spikes the 5s sample and its vanishing spikes
    // the 6s sample; the second detection is the same event and must be
    // suppressed.
    assert_eq!(clips.len(), 1);

    let clip = &clips[0];
    assert_eq!(clip.event.detection_time, Duration::from_secs(5));
    assert_eq!(clip.event.clip_start, Duration::from_secs(0));
    assert_eq!(clip.event.clip_end, Duration::from_secs(10));
    assert_eq!(clip.frames, 300, "ten seconds at 30 fps");
    assert_eq!(
        clip.path.file_name().and_then(|name| name.to_str()),
        Some("lot_east_clip_0s.avi")
    );

    // The clip must decode on its own, at the source's resolution and rate.
    let clip_source = VideoSource::open(&clip.path).expect("open extracted clip");
    assert_eq!(clip_source.metadata().width, common::WIDTH);
    assert_eq!(clip_source.metadata().height, common::HEIGHT);
    assert!((clip_source.metadata().frames_per_second - 30.0).abs() < 0.01);
}

#[test]
fn clip_truncates_at_end_of_recording() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("short.avi");
    // 8 seconds of footage with the event at 5s; the 10-second clip window
    // runs past the end of the recording.
    if let Err(reason) = common::synthesize_footage(&video, 240, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let clips = Scanner::new(ScanOptions::new(common::motion_region()))
        .scan(&mut source, &dir.path().join("clips"), &NullObserver)
        .expect("scan");

    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].event.clip_start, Duration::from_secs(0));
    assert_eq!(
        clips[0].frames, 240,
        "clip stops at the end of the recording instead of failing"
    );
}

#[test]
fn late_event_gets_pre_roll_and_start_in_name() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("dock.avi");
    // Motion at the 7s sample: clip starts 5s earlier.
    if let Err(reason) = common::synthesize_footage(&video, 450, 210..240) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let clips = Scanner::new(ScanOptions::new(common::motion_region()))
        .scan(&mut source, &dir.path().join("clips"), &NullObserver)
        .expect("scan");

    assert_eq!(clips.len(), 1);
    let clip = &clips[0];
    assert_eq!(clip.event.detection_time, Duration::from_secs(7));
    assert_eq!(clip.event.clip_start, Duration::from_secs(2));
    assert_eq!(clip.event.clip_end, Duration::from_secs(12));
    assert_eq!(clip.frames, 300);
    assert_eq!(
        clip.path.file_name().and_then(|name| name.to_str()),
        Some("dock_clip_2s.avi")
    );
}

#[test]
fn quiet_footage_produces_no_clips() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("nothing.avi");
    if let Err(reason) = common::synthesize_footage(&video, 240, 0..0) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let clips_dir = dir.path().join("clips");
    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let clips = Scanner::new(ScanOptions::new(common::motion_region()))
        .scan(&mut source, &clips_dir, &NullObserver)
        .expect("scan");

    assert!(clips.is_empty());
    assert!(clips_dir.exists(), "output directory is created regardless");
}

#[test]
fn observer_sees_pipeline_in_order() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("watched.avi");
    if let Err(reason) = common::synthesize_footage(&video, 450, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let observer = RecordingObserver::new();
    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    Scanner::new(ScanOptions::new(common::motion_region()))
        .scan(&mut source, &dir.path().join("clips"), &observer)
        .expect("scan");

    let labels = observer.labels.lock().unwrap();
    assert_eq!(labels.first(), Some(&"started"));
    assert_eq!(labels.last(), Some(&"finished"));
    assert!(!labels.contains(&"failed"));

    // 15 seconds sampled once per second.
    assert_eq!(labels.iter().filter(|&&label| label == "sample").count(), 15);

    // Each detection is announced before its clip is written.
    let motion_position = labels.iter().position(|&label| label == "motion");
    let clip_position = labels.iter().position(|&label| label == "clip");
    match (motion_position, clip_position) {
        (Some(motion), Some(clip)) => assert!(motion < clip),
        other => panic!("expected a motion and a clip event, got {other:?}"),
    }
}

#[test]
fn scan_results_are_deterministic() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("repeat.avi");
    if let Err(reason) = common::synthesize_footage(&video, 450, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let scanner = Scanner::new(ScanOptions::new(common::motion_region()));
    let run = |output: &std::path::Path| {
        let mut source = VideoSource::open(&video).expect("open synthesized footage");
        scanner
            .scan(&mut source, output, &NullObserver)
            .expect("scan")
    };

    let first = run(&dir.path().join("clips_a"));
    let second = run(&dir.path().join("clips_b"));

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.event, b.event);
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.path.file_name(), b.path.file_name());
    }
}

#[test]
fn oversized_region_is_clamped_not_fatal() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("clamped.avi");
    if let Err(reason) = common::synthesize_footage(&video, 450, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    // Calibration numbers from a larger camera: watch everything.
    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let clips = Scanner::new(ScanOptions::new(Region::new(0, 0, 4_000, 4_000)))
        .scan(&mut source, &dir.path().join("clips"), &NullObserver)
        .expect("scan with clamped region");

    assert_eq!(clips.len(), 1);
}

#[test]
fn region_outside_frame_fails_the_scan() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let video = dir.path().join("offside.avi");
    if let Err(reason) = common::synthesize_footage(&video, 60, 0..0) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let mut source = VideoSource::open(&video).expect("open synthesized footage");
    let result = Scanner::new(ScanOptions::new(Region::new(5_000, 5_000, 10, 10))).scan(
        &mut source,
        &dir.path().join("clips"),
        &NullObserver,
    );

    match result {
        Err(MotioncutError::RegionOutsideFrame { width, height, .. }) => {
            assert_eq!(width, common::WIDTH);
            assert_eq!(height, common::HEIGHT);
        }
        other => panic!("expected RegionOutsideFrame, got {other:?}"),
    }
}
