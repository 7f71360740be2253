//! Segment planning from a normalized timeline.

use crate::models::{NormalizedTimeline, Segment, SegmentPlan, TakeFileMap};
use crate::orchestrator::{StitchError, StitchResult};

/// Derive one trim segment per switch point.
///
/// Segment `i` starts at `points[i].time` and ends at the next switch
/// point, or at `duration` for the last one. The end of the last segment
/// is never taken from the media itself.
pub fn plan_segments(
    timeline: &NormalizedTimeline,
    duration: f64,
    takes: &TakeFileMap,
) -> StitchResult<SegmentPlan> {
    if !duration.is_finite() {
        return Err(StitchError::validation(format!(
            "duration must be a finite number of seconds, got {}",
            duration
        )));
    }

    let points = timeline.points();
    let mut segments = Vec::with_capacity(points.len());

    for (index, point) in points.iter().enumerate() {
        let start = point.time;
        let end = points.get(index + 1).map(|next| next.time).unwrap_or(duration);
        let length = end - start;

        if length <= 0.0 {
            return Err(StitchError::validation(format!(
                "segment {} for take {} has non-positive length ({}s to {}s); \
                 duration must be greater than the last switch time",
                index, point.take_index, start, end
            )));
        }

        let source_file = takes
            .get(&point.take_index)
            .ok_or_else(|| StitchError::resolution(point.take_index.clone()))?;

        segments.push(Segment {
            index,
            take: point.take_index.clone(),
            source_file: source_file.to_path_buf(),
            start_offset: start,
            length,
        });
    }

    Ok(SegmentPlan {
        segments,
        duration,
        anchor: timeline.anchor(),
    })
}
