//! Clip extraction — cut a time window out of a recording into its own file.
//!
//! [`ClipWriter`] decodes the frames of a window and re-encodes them into a
//! standalone clip. Re-encoding rather than stream-copying keeps the cut
//! exact: a copied stream could only start on a keyframe, which on sparse
//! surveillance footage may sit many seconds before the motion.
//!
//! Each extraction opens the source file on its own handle, so a scan in
//! progress keeps its read position in the same file undisturbed.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use motioncut::{ClipOptions, ClipWriter, MotioncutError};
//!
//! let writer = ClipWriter::new(ClipOptions::new());
//! let frames = writer.extract(
//!     Path::new("camera3_night.avi"),
//!     Duration::from_secs(42),
//!     Duration::from_secs(10),
//!     Path::new("clips/camera3_night_clip_42s.avi"),
//! )?;
//! println!("wrote {frames} frames");
//! # Ok::<(), MotioncutError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Error as FfmpegError, Packet};

use crate::conversion;
use crate::error::MotioncutError;
use crate::source::stream_frame_rate;

/// Codec used for extracted clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipCodec {
    /// MPEG-4 Part 2 in an AVI container. The default, because it is what
    /// classic DVR exports already use, so clips drop into the same review
    /// tooling as the originals.
    #[default]
    Mpeg4,
    /// H.264 / AVC, usually in MP4.
    H264,
    /// H.265 / HEVC, usually in MP4.
    H265,
}

impl ClipCodec {
    fn to_codec_id(self) -> Id {
        match self {
            ClipCodec::Mpeg4 => Id::MPEG4,
            ClipCodec::H264 => Id::H264,
            ClipCodec::H265 => Id::HEVC,
        }
    }

    fn input_pixel_format(self) -> Pixel {
        // All three encoders accept YUV420P input.
        Pixel::YUV420P
    }

    /// File extension of the container this codec is normally written to.
    pub fn default_extension(self) -> &'static str {
        match self {
            ClipCodec::Mpeg4 => "avi",
            ClipCodec::H264 | ClipCodec::H265 => "mp4",
        }
    }
}

/// Options for clip encoding.
#[derive(Debug, Clone, Default)]
pub struct ClipOptions {
    codec: ClipCodec,
    bitrate: Option<usize>,
    extension: Option<String>,
}

impl ClipOptions {
    /// MPEG-4 Part 2 clips in AVI, at the encoder's default rate control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the codec.
    pub fn codec(mut self, codec: ClipCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Override the file extension implied by the codec.
    pub fn extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// The extension clips are named with: the override if one was set,
    /// otherwise the codec's usual container.
    pub fn effective_extension(&self) -> &str {
        self.extension
            .as_deref()
            .unwrap_or(self.codec.default_extension())
    }
}

/// File name for a clip cut from `source_stem` starting at `clip_start`.
///
/// The start is truncated to whole seconds: a clip beginning at 4.7s into
/// `lot_east.avi` is named `lot_east_clip_4s.avi`. Two clips from the same
/// file can never collide, since accepted clip starts are always more than
/// a clip length apart.
pub fn clip_file_name(source_stem: &str, clip_start: Duration, extension: &str) -> String {
    format!("{source_stem}_clip_{}s.{extension}", clip_start.as_secs())
}

/// Cuts clips out of source recordings.
///
/// Create via [`ClipWriter::new`], then call [`extract`](ClipWriter::extract)
/// once per clip. The writer holds no file handles between extractions.
#[derive(Debug, Clone, Default)]
pub struct ClipWriter {
    options: ClipOptions,
}

impl ClipWriter {
    /// Create a new clip writer with the given options.
    pub fn new(options: ClipOptions) -> Self {
        Self { options }
    }

    /// The options this writer encodes with.
    pub fn options(&self) -> &ClipOptions {
        &self.options
    }

    /// Re-encode the window `[start, start + duration)` of `source_path`
    /// into `output_path`, preserving the source's resolution and frame
    /// rate. Returns the number of frames written.
    ///
    /// The source running out before the window ends is not an error; the
    /// clip is simply shorter than requested. A window that starts past the
    /// end of the source yields a valid zero-frame file.
    ///
    /// # Errors
    ///
    /// - [`MotioncutError::FileOpen`] / [`MotioncutError::NoVideoStream`] /
    ///   [`MotioncutError::UnsupportedVideo`] if the source cannot be read.
    /// - [`MotioncutError::DecodeError`] on decoder or scaler failure.
    /// - [`MotioncutError::ClipEncodeError`] if the encoder is unavailable
    ///   or rejects a frame.
    /// - [`MotioncutError::ClipWriteError`] on container or I/O failure.
    pub fn extract(
        &self,
        source_path: &Path,
        start: Duration,
        duration: Duration,
        output_path: &Path,
    ) -> Result<u64, MotioncutError> {
        log::debug!(
            "Extracting [{:.2}s, {:.2}s) of {} into {}",
            start.as_secs_f64(),
            (start + duration).as_secs_f64(),
            source_path.display(),
            output_path.display(),
        );

        let mut input =
            ffmpeg_next::format::input(&source_path).map_err(|error| MotioncutError::FileOpen {
                path: source_path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(MotioncutError::NoVideoStream)?;
        let input_stream_index = stream.index();
        let input_time_base = stream.time_base();
        let rate = stream_frame_rate(&stream).ok_or_else(|| {
            MotioncutError::UnsupportedVideo("stream reports no frame rate".to_string())
        })?;
        let fps = rate.numerator() as f64 / rate.denominator() as f64;

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();
        let target_pixel = self.options.codec.input_pixel_format();

        let start_frame = conversion::timestamp_to_frame_number(start, fps);
        let end_frame = conversion::timestamp_to_frame_number(start + duration, fps);

        // Open the output format context.
        let mut output = ffmpeg_next::format::output(&output_path).map_err(|error| {
            MotioncutError::ClipWriteError(format!(
                "cannot create {}: {error}",
                output_path.display()
            ))
        })?;

        // Check if we need a global header before adding the stream (avoids
        // a borrow conflict).
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let codec_id = self.options.codec.to_codec_id();
        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            MotioncutError::ClipEncodeError(format!("codec {codec_id:?} not available"))
        })?;

        let mut output_stream = output.add_stream(encoder_codec).map_err(|error| {
            MotioncutError::ClipWriteError(format!("cannot add stream: {error}"))
        })?;
        let output_stream_index = output_stream.index();

        // Configure the encoder context from the stream's codec parameters.
        let mut encoder = {
            let context =
                CodecContext::from_parameters(output_stream.parameters()).map_err(|error| {
                    MotioncutError::ClipEncodeError(format!("cannot create codec context: {error}"))
                })?;
            context.encoder().video().map_err(|error| {
                MotioncutError::ClipEncodeError(format!("cannot open video encoder: {error}"))
            })?
        };

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(rate.invert());
        encoder.set_frame_rate(Some(rate));
        if let Some(bitrate) = self.options.bitrate {
            encoder.set_bit_rate(bitrate);
        }

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let mut opened_encoder = encoder.open_as(encoder_codec).map_err(|error| {
            MotioncutError::ClipEncodeError(format!("cannot open encoder: {error}"))
        })?;

        // Copy encoder parameters back to the stream.
        output_stream.set_parameters(&opened_encoder);

        output.write_header().map_err(|error| {
            MotioncutError::ClipWriteError(format!("cannot write header: {error}"))
        })?;

        // The muxer may adjust the stream time base while writing the
        // header; read it back for packet rescaling.
        let output_time_base = output
            .stream(output_stream_index)
            .ok_or_else(|| {
                MotioncutError::ClipWriteError("output stream missing after header".to_string())
            })?
            .time_base();
        let encoder_time_base = opened_encoder.time_base();

        let mut scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;

        // Land on a keyframe at or before the clip start; frames decoded
        // ahead of start_frame are dropped below. A failed seek still
        // produces a valid (possibly empty) clip from wherever reading
        // starts.
        let seek_ts = conversion::frame_number_to_seek_timestamp(start_frame, fps);
        if let Err(error) = input.seek(seek_ts, ..seek_ts) {
            log::debug!("Seek to frame {start_frame} failed ({error}); reading from start");
        }

        let mut written: u64 = 0;
        let mut decoded = VideoFrame::empty();
        let mut converted = VideoFrame::empty();
        let mut eof_sent = false;
        let mut reached_end = false;

        while !reached_end {
            if decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0);
                let frame_number = conversion::pts_to_frame_number(pts, input_time_base, fps);
                if frame_number < start_frame {
                    continue;
                }
                if frame_number >= end_frame {
                    reached_end = true;
                    continue;
                }

                scaler
                    .run(&decoded, &mut converted)
                    .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;
                // Clip timestamps restart at zero in encoder time base
                // units (one tick per frame).
                converted.set_pts(Some(written as i64));

                opened_encoder.send_frame(&converted).map_err(|error| {
                    MotioncutError::ClipEncodeError(format!("send_frame failed: {error}"))
                })?;

                // Receive and write encoded packets.
                let mut packet = Packet::empty();
                while opened_encoder.receive_packet(&mut packet).is_ok() {
                    packet.set_stream(output_stream_index);
                    packet.rescale_ts(encoder_time_base, output_time_base);
                    packet.write_interleaved(&mut output).map_err(|error| {
                        MotioncutError::ClipWriteError(format!("write packet failed: {error}"))
                    })?;
                }

                written += 1;
                continue;
            }

            if eof_sent {
                // The source ended inside the window; the clip is shorter
                // than requested, which is fine.
                break;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut input) {
                Ok(()) => {
                    if packet.stream() == input_stream_index
                        && let Err(error) = decoder.send_packet(&packet)
                    {
                        log::debug!(
                            "Decoder rejected packet after {written} clip frame(s) ({error}); finishing early"
                        );
                        if decoder.send_eof().is_err() {
                            break;
                        }
                        eof_sent = true;
                    }
                }
                Err(FfmpegError::Eof) => {
                    if decoder.send_eof().is_err() {
                        break;
                    }
                    eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error; try the next packet.
                }
            }
        }

        // Flush the encoder.
        opened_encoder.send_eof().map_err(|error| {
            MotioncutError::ClipEncodeError(format!("send_eof failed: {error}"))
        })?;

        let mut packet = Packet::empty();
        while opened_encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(output_stream_index);
            packet.rescale_ts(encoder_time_base, output_time_base);
            packet.write_interleaved(&mut output).map_err(|error| {
                MotioncutError::ClipWriteError(format!("write flush packet failed: {error}"))
            })?;
        }

        output.write_trailer().map_err(|error| {
            MotioncutError::ClipWriteError(format!("cannot write trailer: {error}"))
        })?;

        log::debug!("Wrote {written} frame(s) to {}", output_path.display());

        Ok(written)
    }
}
