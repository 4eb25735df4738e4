use std::{
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use motioncut::{
    BatchRunner, BatchSummary, ClipCodec, ClipOptions, FfmpegLogLevel, NullObserver, Region,
    ScanEvent, ScanObserver, ScanOptions, Scanner, VideoSource,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  motioncut scan recordings --out recordings/clips --region 0,420,180x290\n  motioncut scan lot_east.avi --out clips --region 80,60,320x240 --threshold 650000 --progress\n  motioncut probe lot_east.avi --json\n  motioncut completions zsh > _motioncut";

#[derive(Debug, Parser)]
#[command(
    name = "motioncut",
    version,
    about = "Scan security footage for motion and cut clips around each event",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan recordings for motion and cut clips.
    #[command(
        about = "Scan recordings for motion and cut clips",
        after_help = "Examples:\n  motioncut scan recordings --out recordings/clips --region 0,420,180x290\n  motioncut scan lot_east.avi --out clips --region 80,60,320x240 --interval 0.5 --length 15 --progress"
    )]
    Scan {
        /// Recording, or directory of recordings, to scan.
        input: PathBuf,

        /// Directory clips are written into.
        #[arg(long, default_value = "clips")]
        out: PathBuf,

        /// Region of the frame to watch, as X,Y,WxH (e.g. 0,420,180x290).
        #[arg(long)]
        region: String,

        /// Motion score threshold; a sample is a detection only when its
        /// score is strictly greater than this.
        #[arg(long, default_value_t = motioncut::DEFAULT_THRESHOLD)]
        threshold: u64,

        /// Seconds between sample frames.
        #[arg(long, default_value_t = 1.0)]
        interval: f64,

        /// Seconds of pre-roll before each detection.
        #[arg(long, default_value_t = 5.0)]
        lead: f64,

        /// Clip length in seconds.
        #[arg(long, default_value_t = 10.0)]
        length: f64,

        /// Extension of recordings to scan when the input is a directory.
        #[arg(long, default_value = "avi")]
        ext: String,

        /// Clip codec: mpeg4 | h264 | h265.
        #[arg(long, default_value = "mpeg4")]
        codec: String,

        /// Clip encoder bitrate in bits per second.
        #[arg(long)]
        bitrate: Option<usize>,

        /// Output a machine-readable JSON summary instead of console lines.
        #[arg(long)]
        json: bool,
    },

    /// Print metadata for a recording.
    #[command(
        about = "Print recording metadata",
        visible_alias = "info",
        after_help = "Examples:\n  motioncut probe lot_east.avi\n  motioncut probe lot_east.avi --json"
    )]
    Probe {
        /// Recording to inspect.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_codec(value: &str) -> Option<ClipCodec> {
    match value.to_ascii_lowercase().as_str() {
        "mpeg4" | "xvid" | "divx" => Some(ClipCodec::Mpeg4),
        "h264" | "avc" | "x264" => Some(ClipCodec::H264),
        "h265" | "hevc" | "x265" => Some(ClipCodec::H265),
        _ => None,
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

/// Clock-style rendering of a duration: `MM:SS`, or `H:MM:SS` past an hour.
fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Recording length in the banner style: `N min S sec`.
fn format_minutes_seconds(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{} min {} sec", total / 60, total % 60)
}

/// Elapsed time for the end-of-run line, always `HH:MM:SS`.
fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60,
    )
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if global.verbose { "debug" } else { "warn" }),
    )
    .init();

    // FFmpeg's own logging drowns the console at its default level; keep it
    // to errors unless asked otherwise.
    let level = match &global.log_level {
        Some(value) => {
            parse_log_level(value).ok_or(format!("unsupported --log-level: {value}"))?
        }
        None => FfmpegLogLevel::Error,
    };
    motioncut::set_ffmpeg_log_level(level);

    Ok(())
}

/// Writes scan events to the terminal, with an optional progress bar.
struct ConsoleObserver {
    verbose: bool,
    progress: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    fn new(global: &GlobalOptions) -> Self {
        Self {
            verbose: global.verbose,
            progress: global.progress,
            bar: Mutex::new(None),
        }
    }

    /// Print a line without tearing the progress bar, when one is active.
    fn println(&self, line: String) {
        if let Ok(bar) = self.bar.lock()
            && let Some(bar) = bar.as_ref()
        {
            bar.println(line);
            return;
        }
        println!("{line}");
    }

    fn clear_bar(&self) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(bar) = bar.take()
        {
            bar.finish_and_clear();
        }
    }
}

impl ScanObserver for ConsoleObserver {
    fn on_event(&self, event: &ScanEvent<'_>) {
        match event {
            ScanEvent::VideoStarted {
                path,
                metadata,
                expected_samples,
            } => {
                self.println(format!(
                    "{} {} ({}x{} @ {:.2} fps, {})",
                    "scanning:".cyan().bold(),
                    path.display(),
                    metadata.width,
                    metadata.height,
                    metadata.frames_per_second,
                    format_minutes_seconds(metadata.duration),
                ));
                if self.progress
                    && let Some(total) = *expected_samples
                    && let Ok(mut slot) = self.bar.lock()
                {
                    let bar = ProgressBar::new(total);
                    if let Ok(style) = ProgressStyle::with_template(
                        "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                    ) {
                        bar.set_style(style.progress_chars("##-"));
                    }
                    *slot = Some(bar);
                }
            }
            ScanEvent::SampleDecoded {
                index, timestamp, ..
            } => {
                if let Ok(bar) = self.bar.lock()
                    && let Some(bar) = bar.as_ref()
                {
                    bar.set_position(index + 1);
                } else if self.verbose {
                    eprintln!("sample {} at {}", index, format_clock(*timestamp));
                }
            }
            ScanEvent::MotionDetected { event, .. } => {
                self.println(format!(
                    "  {} motion at {} (score {})",
                    "event:".yellow().bold(),
                    format_clock(event.detection_time),
                    event.score,
                ));
            }
            ScanEvent::ClipSaved { clip, frames, .. } => {
                self.println(format!(
                    "  {} {} ({} frame(s))",
                    "saved:".green().bold(),
                    clip.display(),
                    frames,
                ));
            }
            ScanEvent::VideoFinished {
                clips, elapsed, ..
            } => {
                self.clear_bar();
                self.println(format!(
                    "{} {} clip(s) in {:.1}s",
                    "finished:".green().bold(),
                    clips,
                    elapsed.as_secs_f64(),
                ));
            }
            ScanEvent::VideoFailed { path, error } => {
                self.clear_bar();
                eprintln!(
                    "{} {}: {}",
                    "failed:".red().bold(),
                    path.display(),
                    error,
                );
            }
            _ => {}
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Scan {
            input,
            out,
            region,
            threshold,
            interval,
            lead,
            length,
            ext,
            codec,
            bitrate,
            json,
        } => {
            let region: Region = region.parse()?;
            let codec =
                parse_codec(&codec).ok_or(format!("unsupported --codec: {codec}"))?;
            if interval <= 0.0 {
                return Err("--interval must be greater than 0".into());
            }
            if length <= 0.0 {
                return Err("--length must be greater than 0".into());
            }

            let options = ScanOptions::new(region)
                .threshold(threshold)
                .sample_interval(Duration::from_secs_f64(interval))
                .pre_roll(Duration::from_secs_f64(lead.max(0.0)))
                .clip_duration(Duration::from_secs_f64(length));

            let mut clip_options = ClipOptions::new().codec(codec);
            if let Some(bitrate) = bitrate {
                clip_options = clip_options.bitrate(bitrate);
            }

            let console = ConsoleObserver::new(&cli.global);
            let quiet = NullObserver;
            let observer: &dyn ScanObserver = if json { &quiet } else { &console };

            let summary = if input.is_dir() {
                BatchRunner::new(&input, &out, options)
                    .extension(ext)
                    .clip_options(clip_options)
                    .run(observer)?
            } else {
                let started = Instant::now();
                let mut source = VideoSource::open(&input)?;
                let clips = Scanner::new(options)
                    .clip_options(clip_options)
                    .scan(&mut source, &out, observer)?;
                BatchSummary {
                    videos_found: 1,
                    videos_scanned: 1,
                    videos_failed: 0,
                    clips,
                    elapsed: started.elapsed(),
                }
            };

            if json {
                let clips: Vec<_> = summary
                    .clips
                    .iter()
                    .map(|clip| {
                        json!({
                            "source": clip.source.display().to_string(),
                            "path": clip.path.display().to_string(),
                            "detected_at_seconds": clip.event.detection_time.as_secs_f64(),
                            "start_seconds": clip.event.clip_start.as_secs_f64(),
                            "end_seconds": clip.event.clip_end.as_secs_f64(),
                            "score": clip.event.score,
                            "frames": clip.frames,
                        })
                    })
                    .collect();
                let payload = json!({
                    "videos_found": summary.videos_found,
                    "videos_scanned": summary.videos_scanned,
                    "videos_failed": summary.videos_failed,
                    "elapsed_seconds": summary.elapsed.as_secs_f64(),
                    "clips": clips,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if summary.videos_found == 0 {
                println!(
                    "{} {}",
                    "notice:".yellow().bold(),
                    format!("no matching recordings in {}", input.display()).yellow(),
                );
            } else {
                if summary.videos_failed > 0 {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!("{} video(s) skipped", summary.videos_failed).yellow(),
                    );
                }
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "{} clip(s) from {} video(s) in {}",
                        summary.clips.len(),
                        summary.videos_scanned,
                        format_elapsed(summary.elapsed),
                    )
                    .green(),
                );
            }
        }
        Commands::Probe { input, json } => {
            let source = VideoSource::open(&input)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "format": metadata.format,
                    "codec": metadata.codec,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!(
                    "Duration: {} ({:.3}s)",
                    format_clock(metadata.duration),
                    metadata.duration.as_secs_f64(),
                );
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
                println!("Frames: ~{}", metadata.frame_count);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "motioncut", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
