//! Timeline derivation: switch points → normalized timeline → segment plan.
//!
//! Both stages are pure functions; the orchestrator steps wrap them.

mod normalizer;
mod planner;

pub use normalizer::normalize;
pub use planner::plan_segments;
