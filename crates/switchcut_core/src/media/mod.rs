//! External media engine access.
//!
//! The pipeline talks to the media engine only through
//! [`MediaToolRunner`]. [`FfmpegRunner`] is the production implementation;
//! tests plug in scripted fakes.

mod concat_list;
mod ffmpeg;
mod process;
mod runner;

pub use concat_list::{render_concat_list, write_concat_list};
pub use ffmpeg::{concat_args, mux_args, trim_args, FfmpegRunner};
pub use process::{describe_command, run_interruptible};
pub use runner::{
    ConcatJob, MediaToolRunner, MuxJob, ToolError, ToolOutput, ToolResult, TrimJob,
};
