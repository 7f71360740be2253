//! Data models for switchcut.
//!
//! This module contains the core data structures of a render run:
//! - Take identifiers and the take → file mapping
//! - Switch points and the normalized timeline
//! - Derived segments, segment plans and intermediate clips
//! - The render request handed over by the transport shell

mod request;
mod segment;
mod take;
mod timeline;

pub use request::{RenderMetadata, RenderRequest, TakeFileMap, UploadedMedia, AUDIO_FIELD};
pub use segment::{IntermediateClip, Segment, SegmentPlan};
pub use take::{TakeId, VIDEO_FIELD_PREFIX};
pub use timeline::{NormalizedTimeline, SwitchPoint};
