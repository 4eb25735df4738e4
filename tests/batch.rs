//! Batch runs over a directory of recordings.

mod common;

use std::path::PathBuf;
use std::sync::Mutex;

use motioncut::{BatchRunner, NullObserver, ScanEvent, ScanObserver, ScanOptions};

/// Captures which videos a run gave up on.
struct FailureObserver {
    failures: Mutex<Vec<PathBuf>>,
}

impl FailureObserver {
    fn new() -> Self {
        Self {
            failures: Mutex::new(Vec::new()),
        }
    }
}

impl ScanObserver for FailureObserver {
    fn on_event(&self, event: &ScanEvent<'_>) {
        if let ScanEvent::VideoFailed { path, .. } = event {
            self.failures.lock().unwrap().push(path.to_path_buf());
        }
    }
}

#[test]
fn empty_directory_yields_empty_summary() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("recordings");
    let output = dir.path().join("clips");
    std::fs::create_dir(&input).expect("create input dir");

    let summary = BatchRunner::new(&input, &output, ScanOptions::new(common::motion_region()))
        .run(&NullObserver)
        .expect("run over empty directory");

    assert_eq!(summary.videos_found, 0);
    assert_eq!(summary.videos_scanned, 0);
    assert_eq!(summary.videos_failed, 0);
    assert!(summary.clips.is_empty());
    assert!(output.exists(), "output directory is created up front");
}

#[test]
fn collect_videos_filters_and_sorts_by_name() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["c.avi", "a.AVI", "b.avi", "notes.txt", "clip.mp4"] {
        std::fs::write(dir.path().join(name), b"").expect("write placeholder");
    }
    // A directory with a matching name must not be picked up.
    std::fs::create_dir(dir.path().join("sub.avi")).expect("create decoy dir");

    let runner = BatchRunner::new(
        dir.path(),
        dir.path().join("clips"),
        ScanOptions::new(common::motion_region()),
    );
    let names: Vec<_> = runner
        .collect_videos()
        .expect("collect")
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()).map(String::from))
        .collect();
    assert_eq!(names, ["a.AVI", "b.avi", "c.avi"]);

    // The extension filter takes a leading dot and compares case-insensitively.
    let mp4_names: Vec<_> = runner
        .clone()
        .extension(".MP4")
        .collect_videos()
        .expect("collect mp4")
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()).map(String::from))
        .collect();
    assert_eq!(mp4_names, ["clip.mp4"]);
}

#[test]
fn bad_file_is_skipped_and_the_run_continues() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("recordings");
    std::fs::create_dir(&input).expect("create input dir");

    // Sorts first, fails first: the good recording after it must still scan.
    std::fs::write(input.join("a_truncated.avi"), b"not a video").expect("write garbage");
    if let Err(reason) = common::synthesize_footage(&input.join("b_good.avi"), 240, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let observer = FailureObserver::new();
    let summary = BatchRunner::new(
        &input,
        dir.path().join("clips"),
        ScanOptions::new(common::motion_region()),
    )
    .run(&observer)
    .expect("run");

    assert_eq!(summary.videos_found, 2);
    assert_eq!(summary.videos_scanned, 1);
    assert_eq!(summary.videos_failed, 1);
    assert_eq!(summary.clips.len(), 1);
    assert_eq!(
        summary.clips[0].source.file_name().and_then(|name| name.to_str()),
        Some("b_good.avi")
    );

    let failures = observer.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].file_name().and_then(|name| name.to_str()),
        Some("a_truncated.avi")
    );
}

#[test]
fn batch_scans_every_matching_video() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("recordings");
    let output = dir.path().join("clips");
    std::fs::create_dir(&input).expect("create input dir");

    if let Err(reason) = common::synthesize_footage(&input.join("cam1.avi"), 240, 150..180) {
        eprintln!("Skipping: {reason}");
        return;
    }
    if let Err(reason) = common::synthesize_footage(&input.join("cam2.avi"), 240, 0..0) {
        eprintln!("Skipping: {reason}");
        return;
    }

    let summary = BatchRunner::new(&input, &output, ScanOptions::new(common::motion_region()))
        .run(&NullObserver)
        .expect("run");

    assert_eq!(summary.videos_found, 2);
    assert_eq!(summary.videos_scanned, 2);
    assert_eq!(summary.videos_failed, 0);

    // Only cam1 has motion, and its clip lands in the shared output directory.
    assert_eq!(summary.clips.len(), 1);
    let clip = &summary.clips[0];
    assert_eq!(
        clip.source.file_name().and_then(|name| name.to_str()),
        Some("cam1.avi")
    );
    assert_eq!(
        clip.path.file_name().and_then(|name| name.to_str()),
        Some("cam1_clip_0s.avi")
    );
    assert!(clip.path.starts_with(&output));
    assert!(clip.path.exists());
}
