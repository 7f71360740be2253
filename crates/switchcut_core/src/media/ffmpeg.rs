//! ffmpeg-backed media tool runner.
//!
//! Builds ffmpeg argument lists for the three operations and executes
//! them as interruptible child processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::process::run_interruptible;
use super::runner::{ConcatJob, MediaToolRunner, MuxJob, ToolOutput, ToolResult, TrimJob};
use crate::config::{EncodingSettings, Settings};
use crate::orchestrator::Interrupt;

/// Format seconds at full precision.
///
/// `Display` for f64 prints the shortest text that round-trips, so the
/// tool sees exactly the planned offsets and a positive length never
/// collapses to zero.
fn secs(value: f64) -> String {
    format!("{}", value)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Arguments common to every invocation.
///
/// Progress stats are off and only errors reach stderr.
fn base_args() -> Vec<String> {
    ["-hide_banner", "-nostdin", "-nostats", "-loglevel", "error", "-y"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Arguments for trimming one segment.
///
/// Input seeking (`-ss` before `-i`) plus a re-encode at a fixed frame
/// rate and pixel format, with audio dropped, so every clip shares the
/// same stream parameters and can later be stream-copied together.
pub fn trim_args(job: &TrimJob, encoding: &EncodingSettings) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-ss".to_string(),
        secs(job.start),
        "-i".to_string(),
        path_arg(&job.source),
        "-t".to_string(),
        secs(job.length),
        "-r".to_string(),
        format!("{}", job.fps),
        "-an".to_string(),
        "-c:v".to_string(),
        encoding.video_codec.clone(),
        "-pix_fmt".to_string(),
        encoding.pixel_format.clone(),
        path_arg(&job.output),
    ]);
    args
}

/// Arguments for stream-copy concatenation through the concat demuxer.
pub fn concat_args(job: &ConcatJob) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        path_arg(&job.list_file),
        "-c".to_string(),
        "copy".to_string(),
        path_arg(&job.output),
    ]);
    args
}

/// Arguments for merging the silent video with the audio track.
///
/// `-shortest` truncates to the shorter stream.
pub fn mux_args(job: &MuxJob, encoding: &EncodingSettings) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-i".to_string(),
        path_arg(&job.video),
        "-i".to_string(),
        path_arg(&job.audio),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        encoding.mux_video_codec.clone(),
        "-c:a".to_string(),
        encoding.audio_codec.clone(),
        "-shortest".to_string(),
        path_arg(&job.output),
    ]);
    args
}

/// Runs trims, concatenation and muxing through the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Path to ffmpeg executable (None = find in PATH).
    ffmpeg_path: Option<PathBuf>,
    encoding: EncodingSettings,
    poll_interval: Duration,
    error_tail: usize,
}

impl FfmpegRunner {
    pub fn new(encoding: EncodingSettings) -> Self {
        Self {
            ffmpeg_path: None,
            encoding,
            poll_interval: Duration::from_millis(50),
            error_tail: 20,
        }
    }

    /// Configure from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let ffmpeg = settings.encoding.ffmpeg_path.trim();
        let mut runner = Self::new(settings.encoding.clone())
            .with_poll_interval(Duration::from_millis(settings.pipeline.poll_interval_ms))
            .with_error_tail(settings.logging.error_tail as usize);
        if !ffmpeg.is_empty() && ffmpeg != "ffmpeg" {
            runner = runner.with_ffmpeg_path(ffmpeg);
        }
        runner
    }

    /// Set a custom path to the ffmpeg executable.
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    /// How often a running ffmpeg is checked for interruption.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Number of stderr lines kept in failure messages.
    pub fn with_error_tail(mut self, lines: usize) -> Self {
        self.error_tail = lines;
        self
    }

    /// Get the ffmpeg executable path/command.
    fn ffmpeg_cmd(&self) -> &Path {
        self.ffmpeg_path
            .as_deref()
            .unwrap_or_else(|| Path::new("ffmpeg"))
    }

    fn run(&self, args: Vec<String>, output: &Path, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        let mut cmd = Command::new(self.ffmpeg_cmd());
        cmd.args(&args);

        let result = run_interruptible(
            "ffmpeg",
            cmd,
            interrupt,
            self.poll_interval,
            self.error_tail,
        );
        if result.is_err() {
            // Never leave a half-written file behind for a later step to pick up.
            let _ = fs::remove_file(output);
        }
        result
    }
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new(EncodingSettings::default())
    }
}

impl MediaToolRunner for FfmpegRunner {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn trim(&self, job: &TrimJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.run(trim_args(job, &self.encoding), &job.output, interrupt)
    }

    fn concat(&self, job: &ConcatJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.run(concat_args(job), &job.output, interrupt)
    }

    fn mux(&self, job: &MuxJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.run(mux_args(job, &self.encoding), &job.output, interrupt)
    }
}
