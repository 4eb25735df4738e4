//! Timestamp and frame-number arithmetic.
//!
//! The scanner addresses sample points by wall-clock time and the demuxer
//! addresses them by frame number or stream timestamp; these helpers convert
//! between the three. Conversions that land on a frame boundary round to the
//! nearest frame so that fractional frame rates (29.97 and friends) do not
//! drift over long recordings.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy the luminance plane of an FFmpeg video frame into a tightly-packed
/// buffer suitable for [`image::GrayImage::from_raw`].
///
/// FFmpeg frames frequently carry per-row padding (stride > width), which the
/// `image` crate does not accept; this strips it.
pub fn frame_to_gray_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = width as usize;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Timestamp of the sample at `index`, i.e. `index * interval`.
pub fn sample_timestamp(index: u64, interval: Duration) -> Duration {
    Duration::from_secs_f64(interval.as_secs_f64() * index as f64)
}

/// Convert a [`Duration`] to the nearest frame number at the given frame rate.
pub fn timestamp_to_frame_number(timestamp: Duration, frames_per_second: f64) -> u64 {
    (timestamp.as_secs_f64() * frames_per_second).round() as u64
}

/// Rescale a PTS value from stream time base to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Rescale a PTS value to the nearest frame number.
pub fn pts_to_frame_number(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    (pts_to_seconds(pts, time_base) * frames_per_second).round() as u64
}

/// Convert a [`Duration`] to a seek timestamp in AV_TIME_BASE (microseconds).
///
/// `input_context.seek()` (via `avformat_seek_file` with `stream_index = -1`)
/// expects timestamps in AV_TIME_BASE (1/1_000_000), not the stream time
/// base.
pub fn duration_to_seek_timestamp(duration: Duration) -> i64 {
    duration.as_micros() as i64
}

/// Convert a frame number to a seek timestamp in AV_TIME_BASE (microseconds).
pub fn frame_number_to_seek_timestamp(frame_number: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_number as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}

/// Number of samples a scan will visit: the count of indices `i` whose frame
/// number `round(i * interval * fps)` stays below `frame_count`.
///
/// Used for progress totals; a video with an unknown frame count yields
/// `None` and the scan runs until decode exhaustion.
pub fn expected_sample_count(
    frame_count: u64,
    frames_per_second: f64,
    interval: Duration,
) -> Option<u64> {
    if frame_count == 0 {
        return None;
    }
    let frames_per_sample = interval.as_secs_f64() * frames_per_second;
    if frames_per_sample <= 0.0 {
        return None;
    }
    // round(i * f) < n holds exactly when i * f < n - 0.5.
    Some(((frame_count as f64 - 0.5) / frames_per_sample).ceil() as u64)
}
