//! Run entry point: one render request in, one output or one error out.
//!
//! The [`Stitcher`] owns everything around the pipeline itself: the run
//! id, the per-run workspace, the run logger, the interrupt state and
//! the hand-off of the finished bytes to the caller. The workspace is
//! purged on every exit path before the result is returned.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::Settings;
use crate::logging::{LogCallback, LogConfig, RunLogger};
use crate::media::{FfmpegRunner, MediaToolRunner};
use crate::models::{RenderMetadata, RenderRequest, SegmentPlan, TakeFileMap};
use crate::orchestrator::{
    create_standard_pipeline, CancelHandle, Context, Interrupt, ProgressCallback, RunStage,
    RunState, RunWorkspace, StitchError, StitchResult,
};
use crate::timeline::{normalize, plan_segments};

/// Per-run knobs supplied by the transport shell.
#[derive(Default)]
pub struct RunOptions {
    /// Cancelled when the client goes away.
    pub cancel: Option<CancelHandle>,
    /// Overrides `pipeline.deadline_secs` for this run.
    pub deadline: Option<Duration>,
    /// Receives every run log line.
    pub log_callback: Option<LogCallback>,
    /// Receives step progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_log_callback(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary of a delivered run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: String,
    /// Bytes handed to the caller.
    pub bytes_written: u64,
    /// Pipeline steps that completed.
    pub steps_completed: Vec<String>,
    /// MIME type of the delivered container.
    pub content_type: &'static str,
    /// Per-run log file, when run logs are enabled.
    pub log_path: Option<PathBuf>,
}

/// Stitches takes into one video according to switch points.
pub struct Stitcher {
    settings: Settings,
    runner: Arc<dyn MediaToolRunner>,
}

impl Stitcher {
    /// Create a stitcher using `runner` for all media work.
    pub fn new(settings: Settings, runner: Arc<dyn MediaToolRunner>) -> Self {
        Self { settings, runner }
    }

    /// Create a stitcher backed by ffmpeg.
    pub fn with_ffmpeg(settings: Settings) -> Self {
        let runner = Arc::new(FfmpegRunner::from_settings(&settings));
        Self::new(settings, runner)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Normalize and plan only, without touching any media.
    pub fn plan(&self, metadata: &RenderMetadata, takes: &TakeFileMap) -> StitchResult<SegmentPlan> {
        let timeline = normalize(&metadata.switch_points)?;
        plan_segments(&timeline, metadata.duration, takes)
    }

    /// Run the pipeline and write the finished container into `sink`.
    ///
    /// Nothing is written to `sink` unless every step succeeded.
    pub fn render<W: Write>(
        &self,
        request: RenderRequest,
        sink: &mut W,
        options: RunOptions,
    ) -> StitchResult<RunReport> {
        self.execute(request, options, |output| {
            let mut file = File::open(output)?;
            let bytes = io::copy(&mut file, sink)?;
            sink.flush()?;
            Ok(bytes)
        })
    }

    /// Run the pipeline and persist the finished container at `destination`.
    ///
    /// `destination` is only created once the output is complete, and is
    /// removed again if copying it fails.
    pub fn render_to_path(
        &self,
        request: RenderRequest,
        destination: &Path,
        options: RunOptions,
    ) -> StitchResult<RunReport> {
        self.execute(request, options, |output| {
            if let Some(parent) = destination.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::copy(output, destination).inspect_err(|_| {
                let _ = fs::remove_file(destination);
            })
        })
    }

    fn execute<F>(
        &self,
        request: RenderRequest,
        options: RunOptions,
        deliver: F,
    ) -> StitchResult<RunReport>
    where
        F: FnOnce(&Path) -> io::Result<u64>,
    {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);
        let _enter = span.enter();

        let logger = Arc::new(self.create_logger(&run_id, options.log_callback)?);
        let encoding = &self.settings.encoding;

        let workspace = RunWorkspace::create(
            Path::new(&self.settings.paths.temp_root),
            &run_id,
            &encoding.container_extension,
        )
        .map_err(|e| StitchError::workspace("creating run workspace", e))?;
        logger.debug(&format!("Workspace: {}", workspace.path().display()));

        let deadline = options
            .deadline
            .or_else(|| self.settings.pipeline.deadline_secs.map(Duration::from_secs));
        let interrupt = Interrupt::new(options.cancel.unwrap_or_default(), deadline);

        let mut ctx = Context::new(
            request,
            self.settings.clone(),
            run_id.clone(),
            workspace.layout().clone(),
            Arc::clone(&logger),
            Arc::clone(&self.runner),
            interrupt,
        );
        if let Some(callback) = options.progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        let mut state = RunState::new(run_id.clone());
        logger.info(&format!(
            "Run {} started with {} ({} switch point(s), {:.3}s)",
            run_id,
            self.runner.name(),
            ctx.request.metadata.switch_points.len(),
            ctx.request.metadata.duration
        ));

        let outcome = create_standard_pipeline()
            .run(&ctx, &mut state)
            .and_then(|result| {
                let bytes = deliver_output(&ctx, &mut state, deliver)?;
                Ok((result, bytes))
            });

        // Purge before reporting anything to the caller.
        if let Err(e) = workspace.purge() {
            logger.warn(&format!("Failed to purge run workspace: {}", e));
        }

        let report = match outcome {
            Ok((result, bytes_written)) => {
                logger.success(&format!("Delivered {} bytes", bytes_written));
                Ok(RunReport {
                    run_id,
                    bytes_written,
                    steps_completed: result.steps_completed,
                    content_type: encoding.content_type(),
                    log_path: logger.log_path().map(Path::to_path_buf),
                })
            }
            Err(e) => {
                logger.error(&format!("[{}] {}", e.component(), e));
                Err(e)
            }
        };
        logger.close();
        report
    }

    fn create_logger(&self, run_id: &str, callback: Option<LogCallback>) -> StitchResult<RunLogger> {
        let config = LogConfig::from_settings(&self.settings.logging);
        if self.settings.logging.write_run_logs {
            RunLogger::with_file(run_id, &self.settings.paths.logs_folder, config, callback)
                .map_err(|e| StitchError::workspace("creating run log", e))
        } else {
            Ok(RunLogger::new(run_id, config, callback))
        }
    }
}

/// Hand the muxed file to the caller and mark the run delivered.
fn deliver_output<F>(ctx: &Context, state: &mut RunState, deliver: F) -> StitchResult<u64>
where
    F: FnOnce(&Path) -> io::Result<u64>,
{
    let result = ctx.checkpoint(state.stage).and_then(|()| {
        let output = state
            .mux
            .as_ref()
            .map(|m| m.output_path.clone())
            .ok_or_else(|| StitchError::validation("no muxed output to deliver"))?;
        ctx.logger.phase("Deliver");
        deliver(&output).map_err(|source| StitchError::Delivery { source })
    });

    match result {
        Ok(bytes) => {
            state.advance(RunStage::Delivered);
            Ok(bytes)
        }
        Err(e) => {
            state.fail(&e);
            Err(e)
        }
    }
}
