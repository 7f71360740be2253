//! switchcut core - multi-take video stitching driven by switch points.
//!
//! This crate contains the whole render pipeline with no transport
//! dependencies. An HTTP service or the bundled CLI hands it a take →
//! file mapping, one audio track and the switch-point metadata, and gets
//! back the finished container bytes or a single [`StitchError`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchcut_core::{
//!     config::Settings, media::FfmpegRunner, RenderMetadata, RenderRequest, RunOptions, Stitcher,
//!     SwitchPoint, TakeFileMap, TakeId,
//! };
//!
//! let metadata = RenderMetadata::new(
//!     vec![SwitchPoint::new(0.0, 1), SwitchPoint::new(5.0, 2)],
//!     10.0,
//! );
//! let takes = TakeFileMap::from_pairs([
//!     (TakeId::from_index(1), "take1.mp4"),
//!     (TakeId::from_index(2), "take2.mp4"),
//! ])?;
//! let request = RenderRequest::new(metadata, takes, "audio.wav");
//!
//! let settings = Settings::default();
//! let stitcher = Stitcher::new(settings.clone(), Arc::new(FfmpegRunner::from_settings(&settings)));
//! let mut out = std::fs::File::create("out.mp4").unwrap();
//! stitcher.render(request, &mut out, RunOptions::new())?;
//! # Ok::<(), switchcut_core::StitchError>(())
//! ```

pub mod config;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod stitcher;
pub mod timeline;

pub use models::{
    IntermediateClip, NormalizedTimeline, RenderMetadata, RenderRequest, Segment, SegmentPlan,
    SwitchPoint, TakeFileMap, TakeId, UploadedMedia,
};
pub use orchestrator::{CancelHandle, ErrorKind, RunStage, StitchError, StitchResult};
pub use stitcher::{RunOptions, RunReport, Stitcher};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
