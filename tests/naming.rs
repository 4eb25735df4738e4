//! Clip naming and encoding options.

use std::time::Duration;

use motioncut::{ClipCodec, ClipOptions, clip_file_name};

#[test]
fn clip_names_use_whole_second_starts() {
    assert_eq!(
        clip_file_name("lot_east", Duration::from_secs(0), "avi"),
        "lot_east_clip_0s.avi"
    );
    assert_eq!(
        clip_file_name("lot_east", Duration::from_secs(42), "avi"),
        "lot_east_clip_42s.avi"
    );
}

#[test]
fn fractional_starts_are_floored() {
    assert_eq!(
        clip_file_name("cam", Duration::from_secs_f64(4.7), "avi"),
        "cam_clip_4s.avi"
    );
}

#[test]
fn extension_follows_codec_unless_overridden() {
    assert_eq!(ClipOptions::new().effective_extension(), "avi");
    assert_eq!(
        ClipOptions::new()
            .codec(ClipCodec::H264)
            .effective_extension(),
        "mp4"
    );
    assert_eq!(
        ClipOptions::new()
            .codec(ClipCodec::H265)
            .effective_extension(),
        "mp4"
    );
    assert_eq!(
        ClipOptions::new()
            .codec(ClipCodec::H264)
            .extension("mkv")
            .effective_extension(),
        "mkv"
    );
}

#[test]
fn default_codec_is_mpeg4() {
    assert_eq!(ClipCodec::default(), ClipCodec::Mpeg4);
    assert_eq!(ClipCodec::Mpeg4.default_extension(), "avi");
    assert_eq!(ClipCodec::H264.default_extension(), "mp4");
}
