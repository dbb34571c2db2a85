//! Historical pose reconstruction for hit validation.
//!
//! The damage pipeline asks where a victim was `prediction_time` seconds ago
//! (typically the shooter's one-way latency) and tests the hit against that
//! pose instead of the live one.

use glam::Vec3;

use crate::history::PositionHistory;
use crate::sample::PositionSample;

/// Reconstructs the entity's location at `now - prediction_time`.
///
/// - `prediction_time <= 0` returns `current_position` without touching the
///   history.
/// - Otherwise the history is scanned backward for the newest sample strictly
///   older than the target time and the position is linearly interpolated
///   towards the following sample. Interpolation never crosses a teleport and
///   never extrapolates past the newest sample.
/// - A target older than all retained samples yields the oldest sample's
///   position; an empty history yields `current_position`.
///
/// The scan usually ends within a few iterations because prediction times are
/// a fraction of a round trip and the newest samples are visited first.
pub fn rewind_location(
    history: &PositionHistory,
    now: f64,
    current_position: Vec3,
    prediction_time: f64,
) -> Vec3 {
    if prediction_time <= 0.0 {
        return current_position;
    }
    let target_time = now - prediction_time;

    for (index, before) in history.iter().enumerate().rev() {
        if before.timestamp < target_time {
            return match history.get(index + 1) {
                Some(after) => interpolate(before, after, target_time),
                None => before.position,
            };
        }
    }

    history.oldest().map_or(current_position, |oldest| oldest.position)
}

/// Offset from the live position to the rewound one.
///
/// Adding it to any point attached to the entity (head, muzzle, hitbox
/// centre) moves that point back in time along with the body.
pub fn rewind_offset(
    history: &PositionHistory,
    now: f64,
    current_position: Vec3,
    prediction_time: f64,
) -> Vec3 {
    rewind_location(history, now, current_position, prediction_time) - current_position
}

/// Moves `point`, expressed at the entity's live pose, back by `prediction_time`.
pub fn rewind_point(
    point: Vec3,
    history: &PositionHistory,
    now: f64,
    current_position: Vec3,
    prediction_time: f64,
) -> Vec3 {
    point + rewind_offset(history, now, current_position, prediction_time)
}

/// `before.timestamp < target_time <= after.timestamp` holds for every caller.
fn interpolate(before: &PositionSample, after: &PositionSample, target_time: f64) -> Vec3 {
    // Exact hit on the later sample: return it verbatim, no lerp drift.
    if target_time >= after.timestamp {
        return after.position;
    }
    if before.teleported || after.teleported {
        return before.position;
    }
    let span = after.timestamp - before.timestamp;
    if span <= 0.0 {
        return after.position;
    }
    let pct = ((target_time - before.timestamp) / span) as f32;
    before.position + (after.position - before.position) * pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotator::Rotator;

    fn linear_history(times: &[f64]) -> PositionHistory {
        let mut history = PositionHistory::new(10.0);
        for &t in times {
            let s = PositionSample::new(
                Vec3::new(t as f32 * 100.0, 0.0, 0.0),
                Rotator::ZERO,
                Vec3::new(100.0, 0.0, 0.0),
                t,
            );
            history.record(s, t);
        }
        history
    }

    #[test]
    fn test_zero_prediction_returns_live_position() {
        let history = linear_history(&[0.0, 0.25, 0.5]);
        let live = Vec3::new(-7.0, 3.0, 1.0);
        assert_eq!(rewind_location(&history, 0.5, live, 0.0), live);
        assert_eq!(rewind_location(&history, 0.5, live, -1.0), live);
    }

    #[test]
    fn test_empty_history_returns_live_position() {
        let history = PositionHistory::new(1.0);
        let live = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(rewind_location(&history, 5.0, live, 0.1), live);
    }

    #[test]
    fn test_interpolates_between_bracketing_samples() {
        let history = linear_history(&[0.0, 0.25, 0.5]);
        // target = 0.375 → halfway between 25 and 50.
        let pos = rewind_location(&history, 0.5, Vec3::ZERO, 0.125);
        assert!((pos.x - 37.5).abs() < 1e-4, "got {pos:?}");
    }

    #[test]
    fn test_target_beyond_history_returns_oldest() {
        let history = linear_history(&[1.0, 1.25, 1.5]);
        let pos = rewind_location(&history, 1.5, Vec3::ZERO, 5.0);
        assert_eq!(pos, Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn test_target_after_newest_sample_returns_newest() {
        let history = linear_history(&[0.0, 0.25]);
        // now is well past the last sample; target 0.4 has no successor.
        let pos = rewind_location(&history, 0.5, Vec3::splat(9.0), 0.1);
        assert_eq!(pos, Vec3::new(25.0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicate_timestamps_do_not_divide_by_zero() {
        let mut history = PositionHistory::new(10.0);
        history.record(
            PositionSample::new(Vec3::ZERO, Rotator::ZERO, Vec3::ZERO, 0.0),
            0.0,
        );
        history.record(
            PositionSample::new(Vec3::X, Rotator::ZERO, Vec3::ZERO, 0.5),
            0.5,
        );
        history.record(
            PositionSample::new(Vec3::Y, Rotator::ZERO, Vec3::ZERO, 0.5),
            0.5,
        );
        let pos = rewind_location(&history, 0.5, Vec3::ZERO, 0.25);
        assert!(pos.is_finite());
        assert!((pos.x - 0.5).abs() < 1e-6, "got {pos:?}");
    }

    #[test]
    fn test_teleport_on_earlier_sample_blocks_interpolation() {
        let mut history = PositionHistory::new(10.0);
        history.record(
            PositionSample::new(Vec3::ZERO, Rotator::ZERO, Vec3::ZERO, 0.0).with_teleported(true),
            0.0,
        );
        history.record(
            PositionSample::new(Vec3::new(10.0, 0.0, 0.0), Rotator::ZERO, Vec3::ZERO, 0.5),
            0.5,
        );
        let pos = rewind_location(&history, 0.5, Vec3::ZERO, 0.25);
        assert_eq!(pos, Vec3::ZERO);
    }

    #[test]
    fn test_rewind_offset_and_point() {
        let history = linear_history(&[0.0, 0.25, 0.5]);
        let live = Vec3::new(50.0, 0.0, 0.0);
        let offset = rewind_offset(&history, 0.5, live, 0.25);
        assert!((offset.x + 25.0).abs() < 1e-4, "got {offset:?}");

        let head = Vec3::new(50.0, 0.0, 80.0);
        let rewound_head = rewind_point(head, &history, 0.5, live, 0.25);
        assert!(rewound_head.abs_diff_eq(Vec3::new(25.0, 0.0, 80.0), 1e-4));
    }
}
