//! Plan step - derives trim segments from the normalized timeline.

use crate::orchestrator::errors::{StitchError, StitchResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};
use crate::timeline::plan_segments;

/// Builds the `SegmentPlan` and resolves each segment's take file.
pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn description(&self) -> &str {
        "Derive trim segments and resolve take files"
    }

    fn completes(&self) -> RunStage {
        RunStage::Planned
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
        if state.timeline.is_none() {
            return Err(StitchError::validation("no normalized timeline to plan from"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
        let timeline = state
            .timeline
            .as_ref()
            .ok_or_else(|| StitchError::validation("no normalized timeline to plan from"))?;

        let plan = plan_segments(timeline, ctx.request.metadata.duration, &ctx.request.takes)?;

        for segment in plan.iter() {
            ctx.logger.info(&format!(
                "Segment {}: take {} from {:.3}s for {:.3}s",
                segment.index, segment.take, segment.start_offset, segment.length
            ));
        }

        state.plan = Some(plan);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StitchResult<()> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StitchError::validation("segment plan not recorded"))?;

        // Every take referenced by the plan must point at an existing file.
        for segment in plan.iter() {
            if !segment.source_file.is_file() {
                ctx.logger.error(&format!(
                    "Media for take {} not found at {}",
                    segment.take,
                    segment.source_file.display()
                ));
                return Err(StitchError::resolution(segment.take.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TakeId;
    use crate::orchestrator::steps::NormalizeStep;
    use crate::orchestrator::testing::{test_context, two_take_request, ScriptedRunner};
    use crate::orchestrator::ErrorKind;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn normalized(ctx: &Context) -> RunState {
        let mut state = RunState::new("run-1");
        NormalizeStep::new().execute(ctx, &mut state).unwrap();
        state
    }

    #[test]
    fn plans_one_segment_per_switch_point() {
        let dir = tempdir().unwrap();
        let ctx = test_context(
            dir.path(),
            two_take_request(dir.path()),
            Arc::new(ScriptedRunner::new()),
        );
        let mut state = normalized(&ctx);

        let step = PlanStep::new();
        step.validate_input(&ctx, &state).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let plan = state.plan.unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.segments[1].take, TakeId::from_index(2));
        assert_eq!(plan.segments[1].start_offset, 5.0);
    }

    #[test]
    fn missing_take_file_on_disk_is_resolution_error() {
        let dir = tempdir().unwrap();
        let request = two_take_request(dir.path());
        fs::remove_file(dir.path().join("take2.mp4")).unwrap();
        let ctx = test_context(dir.path(), request, Arc::new(ScriptedRunner::new()));
        let mut state = normalized(&ctx);

        let step = PlanStep::new();
        step.execute(&ctx, &mut state).unwrap();
        let err = step.validate_output(&ctx, &state).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.to_string().contains("take 2"));
    }

    #[test]
    fn requires_timeline() {
        let dir = tempdir().unwrap();
        let ctx = test_context(
            dir.path(),
            two_take_request(dir.path()),
            Arc::new(ScriptedRunner::new()),
        );
        assert!(PlanStep::new()
            .validate_input(&ctx, &RunState::new("run-1"))
            .is_err());
    }
}
