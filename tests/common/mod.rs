//! Shared helpers for integration tests that need real recordings.
//!
//! Fixtures are synthesized on the fly: flat gray MPEG-4/AVI footage with a
//! bright square appearing over a known region for a known frame range.
//! Synthesis fails gracefully (the caller skips its test) when the MPEG-4
//! encoder is unavailable on the platform.

// Each test binary compiles this module separately and not all of them use
// every helper.
#![allow(dead_code)]

use std::ops::Range;
use std::path::Path;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::{Packet, Rational};
use motioncut::Region;

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;
pub const FPS: i32 = 30;

const BACKGROUND_LUMA: u8 = 40;
const SQUARE_LUMA: u8 = 235;

/// The frame region the synthetic motion square covers.
pub fn motion_region() -> Region {
    Region::new(40, 40, 120, 120)
}

/// Write `frame_count` frames of flat gray footage to `path`, with a bright
/// square covering [`motion_region`] for the frames in `motion_frames`.
///
/// Returns `Err` with a reason when encoding is unavailable on this
/// platform; callers skip their test in that case.
pub fn synthesize_footage(
    path: &Path,
    frame_count: u64,
    motion_frames: Range<u64>,
) -> Result<(), String> {
    ffmpeg_next::init().map_err(|error| format!("ffmpeg init failed: {error}"))?;

    let mut output = ffmpeg_next::format::output(&path)
        .map_err(|error| format!("cannot open output: {error}"))?;
    let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(Id::MPEG4)
        .ok_or_else(|| "MPEG4 encoder not available".to_string())?;
    let mut stream = output
        .add_stream(codec)
        .map_err(|error| format!("cannot add stream: {error}"))?;
    let stream_index = stream.index();

    let mut encoder = CodecContext::from_parameters(stream.parameters())
        .map_err(|error| format!("cannot create codec context: {error}"))?
        .encoder()
        .video()
        .map_err(|error| format!("cannot create video encoder: {error}"))?;

    encoder.set_width(WIDTH);
    encoder.set_height(HEIGHT);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_time_base(Rational::new(1, FPS));
    encoder.set_frame_rate(Some(Rational::new(FPS, 1)));
    encoder.set_bit_rate(1_000_000);

    if needs_global_header {
        unsafe {
            (*encoder.as_mut_ptr()).flags |= ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
        }
    }

    let mut opened = encoder
        .open_as(codec)
        .map_err(|error| format!("cannot open encoder: {error}"))?;
    stream.set_parameters(&opened);

    output
        .write_header()
        .map_err(|error| format!("cannot write header: {error}"))?;
    let output_time_base = output
        .stream(stream_index)
        .ok_or_else(|| "output stream missing after header".to_string())?
        .time_base();
    let encoder_time_base = opened.time_base();

    let region = motion_region();
    for frame_number in 0..frame_count {
        let mut frame = VideoFrame::new(Pixel::YUV420P, WIDTH, HEIGHT);
        paint(&mut frame, motion_frames.contains(&frame_number), &region);
        frame.set_pts(Some(frame_number as i64));

        opened
            .send_frame(&frame)
            .map_err(|error| format!("send_frame failed: {error}"))?;

        let mut packet = Packet::empty();
        while opened.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(encoder_time_base, output_time_base);
            packet
                .write_interleaved(&mut output)
                .map_err(|error| format!("write packet failed: {error}"))?;
        }
    }

    opened
        .send_eof()
        .map_err(|error| format!("send_eof failed: {error}"))?;
    let mut packet = Packet::empty();
    while opened.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(encoder_time_base, output_time_base);
        packet
            .write_interleaved(&mut output)
            .map_err(|error| format!("write flush packet failed: {error}"))?;
    }

    output
        .write_trailer()
        .map_err(|error| format!("cannot write trailer: {error}"))?;

    Ok(())
}

fn paint(frame: &mut VideoFrame, with_square: bool, region: &Region) {
    let luma_stride = frame.stride(0);
    let luma = frame.data_mut(0);
    for row in 0..HEIGHT as usize {
        for column in 0..WIDTH as usize {
            luma[row * luma_stride + column] = BACKGROUND_LUMA;
        }
    }
    if with_square {
        for row in region.y..region.y + region.height {
            for column in region.x..region.x + region.width {
                luma[row as usize * luma_stride + column as usize] = SQUARE_LUMA;
            }
        }
    }

    // Neutral chroma on both half-resolution planes.
    for plane in 1..=2 {
        let stride = frame.stride(plane);
        let data = frame.data_mut(plane);
        for row in 0..(HEIGHT as usize) / 2 {
            for column in 0..(WIDTH as usize) / 2 {
                data[row * stride + column] = 128;
            }
        }
    }
}
