//! Day-based activity streaks.
//!
//! Timestamps are bucketed into UTC calendar days. The current streak only
//! counts while the latest active day is today or yesterday.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Streaks as of the current UTC day
pub fn calculate_streaks(dates: &[DateTime<Utc>]) -> StreakSummary {
    calculate_streaks_on(dates, Utc::now().date_naive())
}

/// Streaks as of `today`
pub fn calculate_streaks_on(dates: &[DateTime<Utc>], today: NaiveDate) -> StreakSummary {
    let days: BTreeSet<NaiveDate> = dates.iter().map(|d| d.date_naive()).collect();
    // Most recent first
    let days: Vec<NaiveDate> = days.into_iter().rev().collect();

    let Some(most_recent) = days.first().copied() else {
        return StreakSummary::default();
    };

    let yesterday = today - Duration::days(1);
    let current_streak = if most_recent == today || most_recent == yesterday {
        leading_run(&days)
    } else {
        0
    };

    StreakSummary {
        current_streak,
        longest_streak: longest_run(&days),
    }
}

/// Length of the run of consecutive days starting at `days[0]` (descending input)
fn leading_run(days: &[NaiveDate]) -> u32 {
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            break;
        }
    }
    run
}

/// Longest run of consecutive days anywhere in `days` (descending input)
fn longest_run(days: &[NaiveDate]) -> u32 {
    if days.is_empty() {
        return 0;
    }
    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}
