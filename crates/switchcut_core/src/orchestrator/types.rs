//! Core types for the render pipeline.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::errors::{StitchError, StitchResult};
use super::interrupt::{Interrupt, InterruptReason};
use super::workspace::WorkspaceLayout;
use crate::config::Settings;
use crate::logging::RunLogger;
use crate::media::MediaToolRunner;
use crate::models::{IntermediateClip, NormalizedTimeline, RenderRequest, SegmentPlan};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Stage of a run. Runs move strictly forward; `Failed` is terminal and
/// reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RunStage {
    #[default]
    Received,
    Normalized,
    Planned,
    Trimmed,
    Concatenated,
    Muxed,
    Delivered,
    Failed,
}

impl RunStage {
    /// The stage that follows this one on the success path.
    pub fn next(self) -> Option<RunStage> {
        match self {
            RunStage::Received => Some(RunStage::Normalized),
            RunStage::Normalized => Some(RunStage::Planned),
            RunStage::Planned => Some(RunStage::Trimmed),
            RunStage::Trimmed => Some(RunStage::Concatenated),
            RunStage::Concatenated => Some(RunStage::Muxed),
            RunStage::Muxed => Some(RunStage::Delivered),
            RunStage::Delivered | RunStage::Failed => None,
        }
    }

    /// Whether a run in this stage may move to `to`.
    pub fn can_advance_to(self, to: RunStage) -> bool {
        match to {
            RunStage::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStage::Delivered | RunStage::Failed)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Received => "Received",
            RunStage::Normalized => "Normalized",
            RunStage::Planned => "Planned",
            RunStage::Trimmed => "Trimmed",
            RunStage::Concatenated => "Concatenated",
            RunStage::Muxed => "Muxed",
            RunStage::Delivered => "Delivered",
            RunStage::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Read-only context passed to pipeline steps.
///
/// Holds the caller's request and the run-scoped resources. Mutable
/// results go in `RunState`.
pub struct Context {
    /// The caller's render request.
    pub request: RenderRequest,
    /// Application settings.
    pub settings: Settings,
    /// Unique run identifier.
    pub run_id: String,
    /// Frame rate every clip is re-encoded at.
    pub fps: f64,
    /// Paths inside this run's private workspace.
    pub workspace: WorkspaceLayout,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// External media engine.
    pub runner: Arc<dyn MediaToolRunner>,
    /// Cancellation and deadline state.
    pub interrupt: Interrupt,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        request: RenderRequest,
        settings: Settings,
        run_id: impl Into<String>,
        workspace: WorkspaceLayout,
        logger: Arc<RunLogger>,
        runner: Arc<dyn MediaToolRunner>,
        interrupt: Interrupt,
    ) -> Self {
        let fps = request.metadata.fps_or(settings.encoding.default_fps);
        Self {
            request,
            settings,
            run_id: run_id.into(),
            fps,
            workspace,
            logger,
            runner,
            interrupt,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Fail if the run was cancelled or its deadline passed.
    pub fn checkpoint(&self, stage: RunStage) -> StitchResult<()> {
        match self.interrupt.reason() {
            Some(reason) => Err(interrupted(reason, stage)),
            None => Ok(()),
        }
    }
}

/// Map an interrupt to the run-level error for `stage`.
pub(crate) fn interrupted(reason: InterruptReason, stage: RunStage) -> StitchError {
    match reason {
        InterruptReason::DeadlineExceeded => StitchError::DeadlineExceeded { stage },
        InterruptReason::Cancelled | InterruptReason::Aborted => StitchError::Cancelled { stage },
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each step's output is stored in its own section; steps add data but
/// do not overwrite what an earlier step recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunState {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Current stage.
    pub stage: RunStage,
    /// Normalized timeline (from Normalize step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<NormalizedTimeline>,
    /// Segment plan (from Plan step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<SegmentPlan>,
    /// Trimmed clips in plan order (from Trim step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips: Option<Vec<IntermediateClip>>,
    /// Concatenation results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concat: Option<ConcatOutput>,
    /// Mux results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mux: Option<MuxOutput>,
    /// Message of the error that failed the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunState {
    /// Create a new run state in `Received`.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Move to the next stage.
    pub fn advance(&mut self, to: RunStage) {
        debug_assert!(
            self.stage.can_advance_to(to),
            "illegal stage transition {} -> {}",
            self.stage,
            to
        );
        self.stage = to;
    }

    /// Enter the terminal `Failed` stage, keeping the error message.
    pub fn fail(&mut self, error: &StitchError) {
        self.failure = Some(error.to_string());
        self.stage = RunStage::Failed;
    }
}

/// Output from the Concat step.
#[derive(Debug, Clone, Serialize)]
pub struct ConcatOutput {
    /// Concat list handed to the media tool.
    pub list_file: PathBuf,
    /// Silent concatenated video.
    pub video_path: PathBuf,
}

/// Output from the Mux step.
#[derive(Debug, Clone, Serialize)]
pub struct MuxOutput {
    /// Final muxed file inside the workspace.
    pub output_path: PathBuf,
    /// Command that produced it.
    pub command: String,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (nothing to do, but not an error).
    Skipped(String),
}
