use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Action, HealthStatus, Need};
use uuid::Uuid;

use super::animal::AnimalVisit;

/// Lifecycle of a check-in with respect to the reputation aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInState {
    /// Stored, points not yet credited
    Pending,
    /// Points credited to the author
    Applied,
    /// Points taken back ahead of deletion
    Reversed,
}

/// A user's visit to an animal. `points_earned` is fixed at creation so a
/// reversal always takes back exactly what was credited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckIn {
    pub id: String,
    pub user_id: String,
    pub animal_id: String,
    pub actions: Vec<Action>,
    pub actions_description: Option<String>,
    pub health_status: HealthStatus,
    pub needs: Vec<Need>,
    pub needs_description: Option<String>,
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
    pub reversed_at: Option<DateTime<Utc>>,
}

impl CheckIn {
    pub fn generate_id() -> String {
        format!("checkin::{}", Uuid::new_v4())
    }

    pub fn state(&self) -> CheckInState {
        match (self.applied_at, self.reversed_at) {
            (_, Some(_)) => CheckInState::Reversed,
            (Some(_), None) => CheckInState::Applied,
            (None, None) => CheckInState::Pending,
        }
    }

    pub fn visit(&self) -> AnimalVisit {
        AnimalVisit {
            visited_at: self.created_at,
            health: self.health_status,
            needs: self.needs.clone(),
            needs_description: self.needs_description.clone(),
        }
    }
}

/// Longest free-text description accepted on a check-in, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CheckInValidationError {
    #[error("At least one action is required")]
    EmptyActions,
    #[error("{field} is too long (max {max} characters)")]
    DescriptionTooLong { field: &'static str, max: usize },
}

/// Reject a check-in that cannot be scored or stored
pub fn validate_check_in(
    actions: &[Action],
    actions_description: Option<&str>,
    needs_description: Option<&str>,
) -> Result<(), CheckInValidationError> {
    if actions.is_empty() {
        return Err(CheckInValidationError::EmptyActions);
    }
    for (field, value) in [
        ("actionsDescription", actions_description),
        ("needsDescription", needs_description),
    ] {
        if value.map_or(0, |v| v.chars().count()) > MAX_DESCRIPTION_LENGTH {
            return Err(CheckInValidationError::DescriptionTooLong {
                field,
                max: MAX_DESCRIPTION_LENGTH,
            });
        }
    }
    Ok(())
}

/// Drop repeated entries, keeping the first occurrence of each
pub fn dedup_preserving_order<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(*item);
        }
    }
    unique
}
