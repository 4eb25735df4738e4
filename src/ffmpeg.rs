//! FFmpeg log level configuration.
//!
//! FFmpeg has its own logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate, and it defaults to printing
//! warnings on stderr. Archival camera footage is full of bitstream quirks
//! that trigger those warnings on nearly every decode, drowning the
//! scanner's own report lines. This wrapper lets callers tune FFmpeg's
//! verbosity without importing `ffmpeg-next` directly.
//!
//! # Example
//!
//! ```no_run
//! use motioncut::FfmpegLogLevel;
//!
//! // Keep FFmpeg quiet except for real errors.
//! motioncut::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```
//!
//! This controls **FFmpeg's own console output**, not the Rust-side
//! diagnostics emitted via the `log` crate; configure those with a standard
//! subscriber such as `env_logger`.

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only unrecoverable conditions that abort the process.
    Panic,
    /// Unrecoverable errors; the process may continue.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default level).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// This controls what FFmpeg prints to stderr. It does **not** affect
/// Rust-side `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
