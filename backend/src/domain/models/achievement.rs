use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A badge held by a user. Unique per user by `title`, never removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub date_earned: DateTime<Utc>,
}
