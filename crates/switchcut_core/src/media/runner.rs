//! The media tool seam: trim, concat and mux jobs and their results.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::orchestrator::{Interrupt, InterruptReason};

/// Trim one segment out of a take, video only, at a fixed frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimJob {
    pub segment_index: usize,
    pub source: PathBuf,
    /// Seek offset in seconds.
    pub start: f64,
    /// Clip length in seconds.
    pub length: f64,
    pub fps: f64,
    pub output: PathBuf,
}

/// Stream-copy the clips listed in `list_file` into one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatJob {
    pub list_file: PathBuf,
    /// Clips in the order they appear in the list.
    pub clips: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Merge a silent video with the audio track, shortest stream wins.
#[derive(Debug, Clone, PartialEq)]
pub struct MuxJob {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

/// What a successful tool run reports back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Command line that was executed.
    pub command: String,
    /// Diagnostic output lines (ffmpeg writes its log to stderr).
    pub log_lines: Vec<String>,
}

impl ToolOutput {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            log_lines: Vec::new(),
        }
    }
}

/// Failure of one external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be started.
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{tool} failed with exit code {}: {stderr_tail}", .exit_code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string()))]
    Exit {
        tool: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    /// Local I/O around the tool failed.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The tool was killed because the run was interrupted.
    #[error("{tool} stopped: {reason}")]
    Interrupted {
        tool: String,
        reason: InterruptReason,
    },
}

impl ToolError {
    /// Create a spawn error.
    pub fn spawn(tool: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }

    /// Create a non-zero exit error.
    pub fn exit(
        tool: impl Into<String>,
        exit_code: Option<i32>,
        stderr_tail: impl Into<String>,
    ) -> Self {
        Self::Exit {
            tool: tool.into(),
            exit_code,
            stderr_tail: stderr_tail.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an interruption error.
    pub fn interrupted(tool: impl Into<String>, reason: InterruptReason) -> Self {
        Self::Interrupted {
            tool: tool.into(),
            reason,
        }
    }

    /// Interrupt reason, if the tool was stopped rather than failing.
    pub fn interrupt_reason(&self) -> Option<InterruptReason> {
        match self {
            Self::Interrupted { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Capability to run the external media engine.
///
/// The pipeline reaches the engine only through this trait. Each call
/// blocks until the tool finishes, fails, or `interrupt` fires; an
/// implementation must stop its process promptly once
/// `interrupt.reason()` is `Some`.
pub trait MediaToolRunner: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Re-encode `job.length` seconds of `job.source` from `job.start`,
    /// dropping audio.
    fn trim(&self, job: &TrimJob, interrupt: &Interrupt) -> ToolResult<ToolOutput>;

    /// Losslessly concatenate the clips in `job.list_file`.
    fn concat(&self, job: &ConcatJob, interrupt: &Interrupt) -> ToolResult<ToolOutput>;

    /// Merge video and audio into the final container.
    fn mux(&self, job: &MuxJob, interrupt: &Interrupt) -> ToolResult<ToolOutput>;
}
