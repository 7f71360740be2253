//! Switch point normalization.

use crate::models::{NormalizedTimeline, SwitchPoint};
use crate::orchestrator::{StitchError, StitchResult};

/// Sort and validate raw switch points.
///
/// Rejects an empty set, negative or non-finite times, and two points at
/// the same instant. Input order does not matter.
pub fn normalize(points: &[SwitchPoint]) -> StitchResult<NormalizedTimeline> {
    if points.is_empty() {
        return Err(StitchError::validation("at least one switch point is required"));
    }

    for point in points {
        if !point.time.is_finite() {
            return Err(StitchError::validation(format!(
                "switch point for take {} has a non-finite time",
                point.take_index
            )));
        }
        if point.time < 0.0 {
            return Err(StitchError::validation(format!(
                "switch point for take {} has negative time {}",
                point.take_index, point.time
            )));
        }
    }

    let mut sorted = points.to_vec();
    // Stable, so equal times keep caller order in the error message.
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    if let Some(pair) = sorted.windows(2).find(|w| w[0].time == w[1].time) {
        return Err(StitchError::validation(format!(
            "duplicate switch time {}s (takes {} and {})",
            pair[0].time, pair[0].take_index, pair[1].take_index
        )));
    }

    Ok(NormalizedTimeline::from_sorted(sorted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ErrorKind;

    #[test]
    fn sorts_by_time() {
        let timeline = normalize(&[
            SwitchPoint::new(7.5, 3),
            SwitchPoint::new(0.0, 1),
            SwitchPoint::new(2.25, 2),
        ])
        .unwrap();

        let times: Vec<f64> = timeline.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 2.25, 7.5]);
        assert_eq!(timeline.points()[2].take_index.as_str(), "3");
    }

    #[test]
    fn output_is_sorted_with_same_cardinality() {
        // Deterministic shuffles of distinct times.
        for seed in 1..50u64 {
            let n = (seed % 9 + 1) as usize;
            let mut points: Vec<SwitchPoint> = (0..n)
                .map(|i| SwitchPoint::new(i as f64 * 1.5 + (seed as f64) * 0.01, i as u64))
                .collect();
            let mut state = seed;
            for i in (1..points.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                points.swap(i, j);
            }

            let timeline = normalize(&points).unwrap();
            assert_eq!(timeline.len(), points.len());
            assert!(timeline.points().windows(2).all(|w| w[0].time < w[1].time));
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = normalize(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn duplicate_time_is_rejected() {
        let err = normalize(&[SwitchPoint::new(0.0, 1), SwitchPoint::new(0.0, 2)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("duplicate switch time"));
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = normalize(&[SwitchPoint::new(-0.5, 1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn non_finite_time_is_rejected() {
        assert!(normalize(&[SwitchPoint::new(f64::NAN, 1)]).is_err());
        assert!(normalize(&[SwitchPoint::new(f64::INFINITY, 1)]).is_err());
    }

    #[test]
    fn first_point_may_be_after_zero() {
        let timeline = normalize(&[SwitchPoint::new(3.0, 1)]).unwrap();
        assert_eq!(timeline.anchor(), 3.0);
    }
}
