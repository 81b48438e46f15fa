//! Experience levels derived from accumulated points.
//!
//! `level = 1 + floor(sqrt(points / 100))`, so reaching level `n` takes
//! `100 * (n - 1)^2` points. Negative inputs are treated as zero and
//! thresholds past `i64::MAX` saturate.

use shared::ExperienceProgress;

const POINTS_PER_LEVEL_UNIT: i64 = 100;

/// Highest level whose successor threshold still fits in an `i64`
const MAX_EXACT_LEVEL: i64 = 303_700_049;

/// Largest point total whose level band is exactly representable
pub const MAX_POINTS: i64 = POINTS_PER_LEVEL_UNIT * MAX_EXACT_LEVEL * MAX_EXACT_LEVEL - 1;

/// Level reached with `points`
pub fn level_for(points: i64) -> i64 {
    let units = points.max(0) / POINTS_PER_LEVEL_UNIT;
    1 + integer_sqrt(units)
}

/// Points at which `level` starts
pub fn points_required_for_level(level: i64) -> i64 {
    let steps = level.saturating_sub(1).max(0);
    steps.saturating_mul(steps).saturating_mul(POINTS_PER_LEVEL_UNIT)
}

/// Width of the `current_level` band: points between its start and the next level's
pub fn points_to_next_level(current_level: i64) -> i64 {
    let level = current_level.max(1);
    let band_end = points_required_for_level(level.saturating_add(1));
    band_end.saturating_sub(points_required_for_level(level))
}

/// Points still missing before `level + 1`
pub fn points_remaining(points: i64, level: i64) -> i64 {
    points_required_for_level(level.max(1).saturating_add(1))
        .saturating_sub(points)
        .max(0)
}

/// Progress bar data for a user at `points`/`level`
pub fn experience_progress(points: i64, level: i64) -> ExperienceProgress {
    let level = level.max(1);
    let band_start = points_required_for_level(level);
    let band_width = points_to_next_level(level);
    let points_in_current_level = points.saturating_sub(band_start);
    // Only zero once both thresholds saturate
    let progress_percentage = if band_width > 0 {
        (points_in_current_level.saturating_mul(100) / band_width).clamp(0, 100)
    } else {
        100
    };

    ExperienceProgress {
        level,
        next_level: level.saturating_add(1),
        points,
        points_in_current_level,
        points_to_next_level: band_width,
        progress_percentage,
        total_points_needed: points_required_for_level(level.saturating_add(1)),
    }
}

/// Largest `r` with `r * r <= n`
fn integer_sqrt(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut r = (n as f64).sqrt() as i64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(399), 2);
        assert_eq!(level_for(400), 3);
        assert_eq!(level_for(8100), 10);
    }

    #[test]
    fn test_negative_points_stay_at_level_one() {
        assert_eq!(level_for(-50), 1);
    }

    #[test]
    fn test_level_is_monotonic_and_at_least_one() {
        let mut previous = level_for(0);
        for p in 0..=10_000 {
            let level = level_for(p);
            assert!(level >= 1);
            assert!(level >= previous, "level dropped at {} points", p);
            previous = level;
        }
    }

    #[test]
    fn test_level_band_contains_points() {
        for p in 0..=10_000 {
            let level = level_for(p);
            assert!(points_required_for_level(level) <= p);
            assert!(p < points_required_for_level(level + 1));
        }
    }

    #[test]
    fn test_points_to_next_level() {
        assert_eq!(points_required_for_level(1), 0);
        assert_eq!(points_required_for_level(2), 100);
        assert_eq!(points_required_for_level(3), 400);
        assert_eq!(points_to_next_level(1), 100);
        assert_eq!(points_to_next_level(2), 300);
        assert_eq!(points_to_next_level(10), 1900);
    }

    #[test]
    fn test_points_remaining() {
        assert_eq!(points_remaining(0, 1), 100);
        assert_eq!(points_remaining(250, 2), 150);
        assert_eq!(points_remaining(500, 2), 0);
    }

    #[test]
    fn test_experience_progress() {
        let progress = experience_progress(250, 2);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.next_level, 3);
        assert_eq!(progress.points_in_current_level, 150);
        assert_eq!(progress.points_to_next_level, 300);
        assert_eq!(progress.progress_percentage, 50);
        assert_eq!(progress.total_points_needed, 400);
    }

    #[test]
    fn test_experience_progress_is_clamped() {
        // A stale level below the points' real level still reports at most 100%
        assert_eq!(experience_progress(1000, 1).progress_percentage, 100);
        assert_eq!(experience_progress(0, 3).progress_percentage, 0);
    }

    #[test]
    fn test_largest_points_stay_exact() {
        let level = level_for(MAX_POINTS);
        assert_eq!(level, MAX_EXACT_LEVEL);
        assert!(points_required_for_level(level) <= MAX_POINTS);
        assert_eq!(points_required_for_level(level + 1), MAX_POINTS + 1);
        assert_eq!(points_remaining(MAX_POINTS, level), 1);
        assert_eq!(experience_progress(MAX_POINTS, level).progress_percentage, 99);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let level = level_for(i64::MAX);
        assert_eq!(level, MAX_EXACT_LEVEL + 1);
        assert_eq!(points_required_for_level(level + 1), i64::MAX);
        assert!(points_to_next_level(level) >= 0);
        assert_eq!(points_required_for_level(i64::MAX), i64::MAX);
        assert_eq!(points_to_next_level(i64::MAX), 0);

        let progress = experience_progress(i64::MAX, i64::MAX);
        assert_eq!(progress.next_level, i64::MAX);
        assert_eq!(progress.progress_percentage, 100);
    }

    #[test]
    fn test_integer_sqrt_exact_squares() {
        for r in 0..200 {
            assert_eq!(integer_sqrt(r * r), r);
            if r > 0 {
                assert_eq!(integer_sqrt(r * r - 1), r - 1);
            }
        }
    }
}
