//! Mux step - merges the silent video with the audio track.

use super::{log_tool_failure, log_tool_output};
use crate::media::{MuxJob, ToolError};
use crate::orchestrator::errors::{StitchError, StitchResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{interrupted, Context, MuxOutput, RunStage, RunState, StepOutcome};

/// Merges video and audio into the final container.
///
/// Audio is re-encoded to the configured codec and the output stops at
/// the end of the shorter stream.
pub struct MuxStep;

impl MuxStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MuxStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MuxStep {
    fn name(&self) -> &str {
        "Mux"
    }

    fn description(&self) -> &str {
        "Merge video with the audio track"
    }

    fn completes(&self) -> RunStage {
        RunStage::Muxed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        if state.concat.is_none() {
            return Err(StitchError::validation("no concatenated video to mux"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
        let concat = state
            .concat
            .as_ref()
            .ok_or_else(|| StitchError::validation("no concatenated video to mux"))?;

        let job = MuxJob {
            video: concat.video_path.clone(),
            audio: ctx.request.audio.clone(),
            output: ctx.workspace.output_path(),
        };

        ctx.logger.info(&format!(
            "Muxing with audio {} ({})",
            job.audio.display(),
            ctx.settings.encoding.audio_codec
        ));

        let output = match ctx.runner.mux(&job, &ctx.interrupt) {
            Ok(output) => output,
            Err(e) => {
                return Err(match e.interrupt_reason() {
                    Some(reason) => interrupted(reason, state.stage),
                    None => {
                        log_tool_failure(ctx, "mux", &e);
                        StitchError::Mux { source: e }
                    }
                });
            }
        };
        log_tool_output(ctx, &output);

        state.mux = Some(MuxOutput {
            output_path: job.output,
            command: output.command,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        let mux = state
            .mux
            .as_ref()
            .ok_or_else(|| StitchError::validation("mux output not recorded"))?;
        if !mux.output_path.is_file() {
            return Err(StitchError::Mux {
                source: ToolError::exit(
                    "mux",
                    Some(0),
                    format!("{} was not produced", mux.output_path.display()),
                ),
            });
        }
        Ok(())
    }
}
