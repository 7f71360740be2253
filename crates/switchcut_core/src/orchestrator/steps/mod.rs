//! Pipeline step implementations.
//!
//! Each step handles one stage of a render run.

mod concat;
mod mux;
mod normalize;
mod plan;
mod trim;

pub use concat::ConcatStep;
pub use mux::MuxStep;
pub use normalize::NormalizeStep;
pub use plan::PlanStep;
pub use trim::TrimStep;

use crate::media::{ToolError, ToolOutput};
use crate::orchestrator::types::Context;

/// Log the command and diagnostic lines of a finished tool run.
fn log_tool_output(ctx: &Context, output: &ToolOutput) {
    if ctx.settings.logging.show_commands {
        ctx.logger.command(&output.command);
    }
    for line in &output.log_lines {
        ctx.logger.output_line(line);
    }
}

/// Show the tool's last stderr lines after a non-zero exit.
///
/// Output kept from earlier successful runs is dropped first so the tail
/// only shows the failing tool.
fn log_tool_failure(ctx: &Context, header: &str, error: &ToolError) {
    if let ToolError::Exit { stderr_tail, .. } = error {
        ctx.logger.clear_tail();
        for line in stderr_tail.lines() {
            ctx.logger.output_line(line);
        }
        ctx.logger.show_tail(header);
    }
}
