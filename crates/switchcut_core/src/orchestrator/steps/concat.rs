//! Concat step - joins the trimmed clips without re-encoding.

use std::path::PathBuf;

use super::{log_tool_failure, log_tool_output};
use crate::media::{write_concat_list, ConcatJob, ToolError};
use crate::orchestrator::errors::{StitchError, StitchResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{interrupted, ConcatOutput, Context, RunStage, RunState, StepOutcome};

/// Writes the concat list in plan order and stream-copies the clips into
/// one silent video.
pub struct ConcatStep;

impl ConcatStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConcatStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConcatStep {
    fn name(&self) -> &str {
        "Concat"
    }

    fn description(&self) -> &str {
        "Stream-copy the clips into one silent video"
    }

    fn completes(&self) -> RunStage {
        RunStage::Concatenated
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        match state.clips {
            Some(ref clips) if !clips.is_empty() => Ok(()),
            _ => Err(StitchError::validation("no trimmed clips to concatenate")),
        }
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
        let clips = state
            .clips
            .as_ref()
            .ok_or_else(|| StitchError::validation("no trimmed clips to concatenate"))?;

        // Clips are already in plan order; sort anyway so the list never
        // depends on how they were recorded.
        let mut ordered = clips.clone();
        ordered.sort_by_key(|c| c.segment_index);
        let paths: Vec<PathBuf> = ordered.into_iter().map(|c| c.path).collect();

        let list_file = ctx.workspace.concat_list_path();
        write_concat_list(&list_file, &paths).map_err(|e| StitchError::Concat {
            source: ToolError::io("writing concat list", e),
        })?;
        ctx.logger
            .debug(&format!("Wrote concat list {}", list_file.display()));

        let job = ConcatJob {
            list_file: list_file.clone(),
            clips: paths,
            output: ctx.workspace.concat_output_path(),
        };

        ctx.logger
            .info(&format!("Concatenating {} clip(s)", job.clips.len()));

        match ctx.runner.concat(&job, &ctx.interrupt) {
            Ok(output) => log_tool_output(ctx, &output),
            Err(e) => {
                return Err(match e.interrupt_reason() {
                    Some(reason) => interrupted(reason, state.stage),
                    None => {
                        log_tool_failure(ctx, "concat", &e);
                        StitchError::Concat { source: e }
                    }
                });
            }
        }

        state.concat = Some(ConcatOutput {
            list_file,
            video_path: job.output,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        let concat = state
            .concat
            .as_ref()
            .ok_or_else(|| StitchError::validation("concat output not recorded"))?;
        if !concat.video_path.is_file() {
            return Err(StitchError::Concat {
                source: ToolError::exit(
                    "concat",
                    Some(0),
                    format!("{} was not produced", concat.video_path.display()),
                ),
            });
        }
        Ok(())
    }
}
