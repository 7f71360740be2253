//! Pipeline orchestrator for coordinating render runs.
//!
//! A run is a fixed sequence of steps. Each step validates its input,
//! does its work, validates its output and moves the run one stage on.
//!
//! # Architecture
//!
//! ```text
//! Pipeline                      RunStage
//!     ├── Step: Normalize   →   Normalized
//!     ├── Step: Plan        →   Planned
//!     ├── Step: Trim        →   Trimmed
//!     ├── Step: Concat      →   Concatenated
//!     └── Step: Mux         →   Muxed
//! ```
//!
//! Delivery and workspace cleanup are handled by [`crate::Stitcher`].
//!
//! # Example
//!
//! ```ignore
//! use switchcut_core::orchestrator::{create_standard_pipeline, Context, RunState};
//!
//! let pipeline = create_standard_pipeline();
//! let ctx = Context::new(request, settings, "run-123", layout, logger, runner, interrupt);
//! let mut state = RunState::new("run-123");
//!
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod interrupt;
mod pipeline;
mod step;
pub mod steps;
mod types;
mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{ErrorKind, StitchError, StitchResult};
pub use interrupt::{CancelHandle, Interrupt, InterruptReason};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ConcatStep, MuxStep, NormalizeStep, PlanStep, TrimStep};
pub use types::{
    ConcatOutput, Context, MuxOutput, ProgressCallback, RunStage, RunState, StepOutcome,
};
pub use workspace::{RunWorkspace, WorkspaceLayout};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Normalize - sort and validate switch points
/// 2. Plan - derive segments and resolve take files
/// 3. Trim - re-encode each segment, video only
/// 4. Concat - stream-copy the clips together
/// 5. Mux - add the audio track, shortest stream wins
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(NormalizeStep::new())
        .with_step(PlanStep::new())
        .with_step(TrimStep::new())
        .with_step(ConcatStep::new())
        .with_step(MuxStep::new())
}
