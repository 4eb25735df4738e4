//! Lazy, pull-based frame sampling at a fixed time interval.
//!
//! [`FrameSampler`] implements [`Iterator`] and decodes one frame per sample
//! point — each call to [`next()`](Iterator::next) seeks to the frame number
//! for the next multiple of the interval, decodes forward from the landing
//! keyframe, and yields that single frame as grayscale. Sampling by absolute
//! time rather than by counting sequential reads means fractional frame
//! rates cannot drift the sample grid over a multi-hour recording.
//!
//! A failed seek or read ends the iteration; end-of-stream is a normal way
//! for a sample sequence to finish, not an error.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use motioncut::{MotioncutError, VideoSource};
//!
//! let mut source = VideoSource::open("camera3_night.avi")?;
//! for sample in source.sample_frames(Duration::from_secs(1))? {
//!     println!("sample {} at {:?}", sample.index, sample.timestamp);
//! }
//! # Ok::<(), MotioncutError>(())
//! ```

use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::GrayImage;

use crate::{conversion, error::MotioncutError, source::VideoSource};

/// One decoded sample point.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Sample index `i` (0, 1, 2, …).
    pub index: u64,
    /// Timestamp of the sample: `i * interval`.
    pub timestamp: Duration,
    /// Frame number the timestamp mapped to: `round(timestamp * fps)`.
    pub frame_number: u64,
    /// The decoded frame at native dimensions, as grayscale.
    pub image: GrayImage,
}

/// A lazy iterator over frames sampled at a fixed interval.
///
/// Borrows the underlying [`VideoSource`] mutably for its lifetime; the
/// source's read position belongs to this iterator until it is dropped.
/// The sequence is finite: it ends when the next sample's frame number
/// reaches the estimated frame count, or earlier when decoding fails.
pub struct FrameSampler<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    fps: f64,
    total_frames: u64,
    interval: Duration,
    width: u32,
    height: u32,
    next_index: u64,
    decoded_frame: VideoFrame,
    gray_frame: VideoFrame,
    finished: bool,
}

impl VideoSource {
    /// Create a [`FrameSampler`] over this source.
    ///
    /// # Errors
    ///
    /// - [`MotioncutError::InvalidInterval`] if `interval` is zero.
    /// - [`MotioncutError::DecodeError`] if a decoder or scaler cannot be
    ///   constructed for the video stream.
    pub fn sample_frames(
        &mut self,
        interval: Duration,
    ) -> Result<FrameSampler<'_>, MotioncutError> {
        FrameSampler::new(self, interval)
    }
}

impl<'a> FrameSampler<'a> {
    pub(crate) fn new(
        source: &'a mut VideoSource,
        interval: Duration,
    ) -> Result<Self, MotioncutError> {
        if interval.is_zero() {
            return Err(MotioncutError::InvalidInterval);
        }

        let metadata = source.metadata().clone();
        let stream_index = source.stream_index;

        let stream = source
            .input_context
            .stream(stream_index)
            .ok_or(MotioncutError::NoVideoStream)?;
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::GRAY8,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| MotioncutError::DecodeError(error.to_string()))?;

        Ok(Self {
            source,
            decoder,
            scaler,
            stream_index,
            time_base,
            fps: metadata.frames_per_second,
            total_frames: metadata.frame_count,
            interval,
            width: metadata.width,
            height: metadata.height,
            next_index: 0,
            decoded_frame: VideoFrame::empty(),
            gray_frame: VideoFrame::empty(),
            finished: false,
        })
    }

    /// Seek to `target` and decode the first frame at or after it.
    ///
    /// Returns `None` on any seek or decode failure; the caller treats that
    /// as the end of the sequence.
    fn decode_frame_at(&mut self, target: u64) -> Option<GrayImage> {
        let seek_ts = conversion::frame_number_to_seek_timestamp(target, self.fps);
        if let Err(error) = self.source.input_context.seek(seek_ts, ..seek_ts) {
            log::debug!("Seek to frame {target} failed ({error}); ending sample sequence");
            return None;
        }
        // The seek landed on a keyframe at or before the target; drop
        // whatever the decoder still holds from the previous sample.
        self.decoder.flush();

        let mut eof_sent = false;
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let pts = self.decoded_frame.pts().unwrap_or(0);
                let current =
                    conversion::pts_to_frame_number(pts, self.time_base, self.fps);
                if current < target {
                    continue;
                }
                // First frame at or past the target. Seeks land before it,
                // so this is the target frame except on streams with pts
                // gaps, where the closest following frame stands in.
                return self.convert_current_frame();
            }

            if eof_sent {
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    if packet.stream() == self.stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        log::debug!(
                            "Decoder rejected packet near frame {target} ({error}); ending sample sequence"
                        );
                        return None;
                    }
                }
                Err(FfmpegError::Eof) => {
                    if self.decoder.send_eof().is_err() {
                        return None;
                    }
                    eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error; try the next packet.
                }
            }
        }
    }

    fn convert_current_frame(&mut self) -> Option<GrayImage> {
        if let Err(error) = self.scaler.run(&self.decoded_frame, &mut self.gray_frame) {
            log::debug!("Grayscale conversion failed ({error}); ending sample sequence");
            return None;
        }
        let buffer = conversion::frame_to_gray_buffer(&self.gray_frame, self.width, self.height);
        GrayImage::from_raw(self.width, self.height, buffer)
    }
}

impl Iterator for FrameSampler<'_> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let index = self.next_index;
        let timestamp = conversion::sample_timestamp(index, self.interval);
        let frame_number = conversion::timestamp_to_frame_number(timestamp, self.fps);

        // The frame-count bound only applies when the container reported a
        // duration; otherwise decode exhaustion is the sole stop condition.
        if self.total_frames > 0 && frame_number >= self.total_frames {
            self.finished = true;
            return None;
        }

        match self.decode_frame_at(frame_number) {
            Some(image) => {
                self.next_index += 1;
                Some(SampledFrame {
                    index,
                    timestamp,
                    frame_number,
                    image,
                })
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}
