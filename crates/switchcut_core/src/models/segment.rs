//! Derived trim segments and the clips produced from them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::take::TakeId;

/// One trim operation: a window of a single take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the plan (0-based, chronological).
    pub index: usize,
    /// Take this segment shows.
    pub take: TakeId,
    /// Media file of the take.
    pub source_file: PathBuf,
    /// Seek offset into the source, in seconds.
    pub start_offset: f64,
    /// Length in seconds (always > 0).
    pub length: f64,
}

impl Segment {
    /// Output time at which this segment ends.
    pub fn end(&self) -> f64 {
        self.start_offset + self.length
    }
}

/// Ordered segment list covering `[anchor, duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Segments in chronological order.
    pub segments: Vec<Segment>,
    /// Total output duration requested by the caller.
    pub duration: f64,
    /// Time of the first switch point.
    pub anchor: f64,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}

/// Trimmed, audio-less clip for one segment, inside the run workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateClip {
    pub segment_index: usize,
    pub path: PathBuf,
}
