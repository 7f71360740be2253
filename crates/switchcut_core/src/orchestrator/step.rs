//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StitchResult;
use super::types::{Context, RunState, RunStage, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// After all three succeed the run moves to [`PipelineStep::completes`].
///
/// # Example
///
/// ```ignore
/// struct PlanStep;
///
/// impl PipelineStep for PlanStep {
///     fn name(&self) -> &str { "Plan" }
///     fn completes(&self) -> RunStage { RunStage::Planned }
///
///     fn validate_input(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
///         state.timeline.as_ref().map(|_| ()).ok_or_else(|| {
///             StitchError::validation("timeline not normalized")
///         })
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome> {
///         state.plan = Some(plan_segments(...)?);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &RunState) -> StitchResult<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Stage the run reaches once this step succeeds.
    fn completes(&self) -> RunStage;

    /// Validate inputs before execution.
    ///
    /// Should check that earlier steps recorded what this step consumes.
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StitchResult<()>;

    /// Execute the step's main work and record results in `state`.
    ///
    /// Use `ctx.logger` for logging and `ctx.report_progress()` for progress.
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StitchResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StitchResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
