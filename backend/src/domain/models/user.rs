use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::achievement::Achievement;

/// Reputation aggregate. `points`, `level` and `total_animals_helped` are
/// written only by the engagement engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub points: i64,
    pub level: i64,
    pub total_animals_helped: i64,
    pub achievements: Vec<Achievement>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn generate_id() -> String {
        format!("user::{}", Uuid::new_v4())
    }

    /// A freshly registered user with zeroed aggregates
    pub fn new(name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(),
            name,
            points: 0,
            level: 1,
            total_animals_helped: 0,
            achievements: Vec::new(),
            created_at: now,
        }
    }

    pub fn has_achievement(&self, title: &str) -> bool {
        self.achievements.iter().any(|a| a.title == title)
    }
}

/// Leaderboard row; achievements are not loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub points: i64,
    pub level: i64,
    pub total_animals_helped: i64,
}
