//! Switch points and the normalized timeline built from them.

use serde::{Deserialize, Serialize};

use super::take::TakeId;

/// The instant at which output switches to the given take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPoint {
    /// Seconds from the start of the output.
    pub time: f64,
    /// Take that becomes active at `time`.
    pub take_index: TakeId,
}

impl SwitchPoint {
    pub fn new(time: f64, take_index: impl Into<TakeId>) -> Self {
        Self {
            time,
            take_index: take_index.into(),
        }
    }
}

/// Switch points strictly ascending by time with no duplicate times.
///
/// Only the normalizer builds these, so holding one means the ordering
/// invariant has been checked. A timeline always holds at least one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTimeline {
    points: Vec<SwitchPoint>,
}

impl NormalizedTimeline {
    /// Wrap points already sorted and validated by the normalizer.
    pub(crate) fn from_sorted(points: Vec<SwitchPoint>) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|w| w[0].time < w[1].time));
        Self { points }
    }

    pub fn points(&self) -> &[SwitchPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a timeline built by the normalizer.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the first switch point, which anchors segment 0.
    pub fn anchor(&self) -> f64 {
        // Non-empty: the normalizer rejects an empty point set.
        self.points[0].time
    }

    /// Time of the last switch point.
    pub fn last_time(&self) -> f64 {
        self.points[self.points.len() - 1].time
    }
}
