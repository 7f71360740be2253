//! Normalize step - sorts and validates the caller's switch points.

use crate::orchestrator::errors::{StitchError, StitchResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};
use crate::timeline::normalize;

/// Turns the raw switch points into a `NormalizedTimeline`.
pub struct NormalizeStep;

impl NormalizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NormalizeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NormalizeStep {
    fn name(&self) -> &str {
        "Normalize"
    }

    fn description(&self) -> &str {
        "Sort and validate switch points"
    }

    fn completes(&self) -> RunStage {
        RunStage::Normalized
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StitchResult<()> {
        if !ctx.fps.is_finite() || ctx.fps <= 0.0 {
            return Err(StitchError::validation(format!(
                "fps must be a positive number, got {}",
                ctx.fps
            )));
        }
        // Caller-supplied input, so it fails before any tool runs.
        if !ctx.request.audio.is_file() {
            return Err(StitchError::validation(format!(
                "audio file missing: {}",
                ctx.request.audio.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
        let points = &ctx.request.metadata.switch_points;
        ctx.logger
            .info(&format!("Normalizing {} switch point(s)", points.len()));

        let timeline = normalize(points)?;
        ctx.logger.debug(&format!(
            "Timeline spans {:.3}s to {:.3}s",
            timeline.anchor(),
            timeline.last_time()
        ));

        state.timeline = Some(timeline);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        match state.timeline {
            Some(ref timeline) if !timeline.is_empty() => Ok(()),
            _ => Err(StitchError::validation("timeline not recorded")),
        }
    }
}
