use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{HealthStatus, Need};
use uuid::Uuid;

/// The subject of care. Visit fields mirror the latest check-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub discovered_by: String,
    pub health: HealthStatus,
    pub needs: Vec<Need>,
    pub needs_description: Option<String>,
    pub visit_count: i64,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Animal {
    pub fn generate_id() -> String {
        format!("animal::{}", Uuid::new_v4())
    }
}

/// The last-write-wins fields a check-in pushes onto its animal
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalVisit {
    pub visited_at: DateTime<Utc>,
    pub health: HealthStatus,
    pub needs: Vec<Need>,
    pub needs_description: Option<String>,
}
