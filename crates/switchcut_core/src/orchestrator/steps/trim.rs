//! Trim step - cuts one video-only clip per segment.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;

use super::{log_tool_failure, log_tool_output};
use crate::media::{ToolError, TrimJob};
use crate::models::{IntermediateClip, Segment};
use crate::orchestrator::errors::{StitchError, StitchResult};
use crate::orchestrator::interrupt::{Interrupt, InterruptReason};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{interrupted, Context, RunStage, RunState, StepOutcome};

/// Re-encodes every planned segment into an intermediate clip.
///
/// Segments run on a per-run pool of `pipeline.max_parallel_trims`
/// threads. The first failure aborts the batch: segments that have not
/// started are skipped and running siblings are killed. Clips are
/// recorded in plan order whatever order they finish in.
pub struct TrimStep;

impl TrimStep {
    pub fn new() -> Self {
        Self
    }

    fn trim_segment(
        &self,
        ctx: &Context,
        stage: RunStage,
        scope: &Interrupt,
        segment: &Segment,
    ) -> StitchResult<IntermediateClip> {
        if let Some(reason) = scope.reason() {
            return Err(interrupted(reason, stage));
        }

        let job = TrimJob {
            segment_index: segment.index,
            source: segment.source_file.clone(),
            start: segment.start_offset,
            length: segment.length,
            fps: ctx.fps,
            output: ctx.workspace.clip_path(segment.index),
        };

        ctx.logger.info(&format!(
            "Trimming segment {} (take {}, {:.3}s + {:.3}s)",
            segment.index, segment.take, segment.start_offset, segment.length
        ));

        match ctx.runner.trim(&job, scope) {
            Ok(output) => {
                log_tool_output(ctx, &output);
                Ok(IntermediateClip {
                    segment_index: segment.index,
                    path: job.output,
                })
            }
            Err(e) => match e.interrupt_reason() {
                Some(reason) => Err(interrupted(reason, stage)),
                None => {
                    log_tool_failure(ctx, &format!("trim segment {}", segment.index), &e);
                    Err(StitchError::Trim {
                        segment_index: segment.index,
                        source: e,
                    })
                }
            },
        }
    }
}

impl Default for TrimStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TrimStep {
    fn name(&self) -> &str {
        "Trim"
    }

    fn description(&self) -> &str {
        "Re-encode each segment into a video-only clip"
    }

    fn completes(&self) -> RunStage {
        RunStage::Trimmed
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StitchResult<()> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StitchError::validation("no segment plan to trim"))?;
        if plan.is_empty() {
            return Err(StitchError::validation("segment plan is empty"));
        }
        if !ctx.workspace.root().is_dir() {
            return Err(StitchError::workspace(
                "checking run workspace",
                io::Error::new(io::ErrorKind::NotFound, "workspace directory missing"),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StitchError::validation("no segment plan to trim"))?;

        let stage = state.stage;
        let total = plan.len();
        let workers = ctx.settings.pipeline.max_parallel_trims.max(1).min(total);
        let scope = ctx.interrupt.scoped();
        let first_error: Mutex<Option<StitchError>> = Mutex::new(None);
        let finished = AtomicUsize::new(0);

        ctx.logger.info(&format!(
            "Trimming {} segment(s) at {} fps with {} worker(s)",
            total, ctx.fps, workers
        ));

        let trim = |segment: &Segment| -> Result<IntermediateClip, ()> {
            match self.trim_segment(ctx, stage, &scope, segment) {
                Ok(clip) => {
                    let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                    let percent = (done * 100 / total) as u32;
                    ctx.report_progress(
                        "Trim",
                        percent,
                        &format!("Trimmed {}/{} segments", done, total),
                    );
                    Ok(clip)
                }
                Err(e) => {
                    // Keep the error that started the teardown, not the
                    // interruptions it causes in siblings.
                    {
                        let mut slot = first_error.lock();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                    }
                    scope.abort();
                    Err(())
                }
            }
        };

        let collected: Result<Vec<IntermediateClip>, ()> = if workers == 1 {
            plan.iter().map(trim).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("switchcut-trim-{}", i))
                .build()
                .map_err(|e| {
                    StitchError::workspace("starting trim workers", io::Error::other(e))
                })?;
            pool.install(|| plan.segments.par_iter().map(trim).collect())
        };

        match collected {
            Ok(clips) => {
                state.clips = Some(clips);
                Ok(StepOutcome::Success)
            }
            Err(()) => Err(first_error
                .into_inner()
                .unwrap_or_else(|| interrupted(InterruptReason::Aborted, stage))),
        }
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        let plan_len = state.plan.as_ref().map(|p| p.len()).unwrap_or(0);
        let clips = state
            .clips
            .as_ref()
            .ok_or_else(|| StitchError::validation("no clips recorded"))?;

        if clips.len() != plan_len {
            return Err(StitchError::validation(format!(
                "expected {} clips, got {}",
                plan_len,
                clips.len()
            )));
        }

        for (i, clip) in clips.iter().enumerate() {
            if clip.segment_index != i {
                return Err(StitchError::validation(format!(
                    "clip {} recorded out of plan order",
                    clip.segment_index
                )));
            }
            if !clip.path.is_file() {
                return Err(StitchError::Trim {
                    segment_index: i,
                    source: ToolError::io(
                        "checking trimmed clip",
                        io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("{} was not produced", clip.path.display()),
                        ),
                    ),
                });
            }
        }
        Ok(())
    }
}
