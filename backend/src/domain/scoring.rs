//! Point values for check-in actions.
//!
//! A check-in is worth the sum of its distinct actions' base values, with a
//! 20% multi-action bonus (rounded down) and a flat bonus when any
//! high-value action is present. An empty action set earns the floor score.

use shared::Action;
use std::collections::BTreeSet;

/// Score for a check-in that reports no actions
pub const MINIMUM_POINTS: i64 = 5;

/// Flat bonus when a veterinary, vaccination or sterilization action is reported
pub const HIGH_VALUE_BONUS: i64 = 10;

/// Base value of a single action
pub fn base_points(action: Action) -> i64 {
    match action {
        Action::Feeding => 10,
        Action::Watering => 8,
        Action::Sheltering => 15,
        Action::WelfareCheck => 5,
        Action::Veterinary => 25,
        Action::Vaccination => 20,
        Action::Sterilization => 30,
        Action::Other => 5,
    }
}

pub fn is_high_value(action: Action) -> bool {
    matches!(
        action,
        Action::Veterinary | Action::Vaccination | Action::Sterilization
    )
}

/// Points earned by a check-in reporting `actions`. Repeated actions count once.
pub fn compute_points(actions: &[Action]) -> i64 {
    let distinct: BTreeSet<Action> = actions.iter().copied().collect();
    if distinct.is_empty() {
        return MINIMUM_POINTS;
    }

    let mut total: i64 = distinct.iter().map(|a| base_points(*a)).sum();

    // floor(total * 1.2) without going through floating point
    if distinct.len() > 1 {
        total = total * 6 / 5;
    }

    if distinct.iter().any(|a| is_high_value(*a)) {
        total += HIGH_VALUE_BONUS;
    }

    total
}
