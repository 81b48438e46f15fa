use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something a volunteer did for an animal during a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Feeding,
    Watering,
    Sheltering,
    WelfareCheck,
    Veterinary,
    Vaccination,
    Sterilization,
    Other,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Feeding,
        Action::Watering,
        Action::Sheltering,
        Action::WelfareCheck,
        Action::Veterinary,
        Action::Vaccination,
        Action::Sterilization,
        Action::Other,
    ];

    /// Wire/storage name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Feeding => "feeding",
            Action::Watering => "watering",
            Action::Sheltering => "sheltering",
            Action::WelfareCheck => "welfare-check",
            Action::Veterinary => "veterinary",
            Action::Vaccination => "vaccination",
            Action::Sterilization => "sterilization",
            Action::Other => "other",
        }
    }
}

/// Reported health of an animal, from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Regular,
    NeedsAttention,
    Emergency,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Regular => "regular",
            HealthStatus::NeedsAttention => "needs-attention",
            HealthStatus::Emergency => "emergency",
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, HealthStatus::Emergency)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Regular
    }
}

/// Something an animal was observed to need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Need {
    Water,
    Food,
    Shelter,
    MedicalTreatment,
    Other,
}

impl Need {
    pub fn as_str(&self) -> &'static str {
        match self {
            Need::Water => "water",
            Need::Food => "food",
            Need::Shelter => "shelter",
            Need::MedicalTreatment => "medical-treatment",
            Need::Other => "other",
        }
    }
}

/// Error returned when a stored or submitted vocabulary value is not recognised
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} value: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariantError {}

impl FromStr for Action {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownVariantError { kind: "action", value: s.to_string() })
    }
}

impl FromStr for HealthStatus {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(HealthStatus::Excellent),
            "good" => Ok(HealthStatus::Good),
            "regular" => Ok(HealthStatus::Regular),
            "needs-attention" => Ok(HealthStatus::NeedsAttention),
            "emergency" => Ok(HealthStatus::Emergency),
            _ => Err(UnknownVariantError { kind: "health", value: s.to_string() }),
        }
    }
}

impl FromStr for Need {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "water" => Ok(Need::Water),
            "food" => Ok(Need::Food),
            "shelter" => Ok(Need::Shelter),
            "medical-treatment" => Ok(Need::MedicalTreatment),
            "other" => Ok(Need::Other),
            _ => Err(UnknownVariantError { kind: "need", value: s.to_string() }),
        }
    }
}

/// Earned badge as shown on a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,
    pub description: String,
    pub icon: String,
    /// RFC 3339 timestamp
    pub date_earned: String,
}

/// User reputation aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub points: i64,
    pub level: i64,
    pub total_animals_helped: i64,
    pub achievements: Vec<Achievement>,
    pub created_at: String,
}

/// Animal record with its visit aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub discovered_by: String,
    pub health: HealthStatus,
    pub needs: Vec<Need>,
    pub needs_description: Option<String>,
    pub visit_count: i64,
    pub last_visit_at: Option<String>,
    pub created_at: String,
}

/// A recorded visit to an animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    pub name: String,
    pub description: String,
    pub health: Option<HealthStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckInRequest {
    pub animal_id: String,
    pub actions: Vec<Action>,
    pub actions_description: Option<String>,
    pub health_status: HealthStatus,
    #[serde(default)]
    pub needs: Vec<Need>,
    pub needs_description: Option<String>,
}

/// What the check-in changed on the user's reputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementOutcome {
    pub points: i64,
    pub level: i64,
    pub first_visit: bool,
    pub new_achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckInResponse {
    pub check_in: CheckIn,
    pub outcome: EngagementOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCheckInResponse {
    pub points: i64,
    pub level: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInListResponse {
    pub check_ins: Vec<CheckIn>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_check_ins: i64,
}

/// Progress bar data for the current level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceProgress {
    pub level: i64,
    pub next_level: i64,
    pub points: i64,
    pub points_in_current_level: i64,
    pub points_to_next_level: i64,
    pub progress_percentage: i64,
    pub total_points_needed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStat {
    pub action: Action,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayStat {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_check_ins: i64,
    pub total_unique_animals: i64,
    pub total_discovered: i64,
    pub action_stats: Vec<ActionStat>,
    pub check_ins_by_weekday: Vec<WeekdayStat>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub user: User,
    pub stats: UserStats,
    pub progress: ExperienceProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: String,
    pub name: String,
    pub points: i64,
    pub level: i64,
    pub total_animals_helped: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub ranking: Vec<RankingEntry>,
    pub user_rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePointsRequest {
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePointsResponse {
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResponse {
    pub points: i64,
    pub level: i64,
    pub points_to_next_level: i64,
    pub progress: ExperienceProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRequest {
    /// RFC 3339 timestamps
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names_round_trip_through_from_str() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("petting".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Action::WelfareCheck).unwrap();
        assert_eq!(json, "\"welfare-check\"");

        let parsed: Action = serde_json::from_str("\"sterilization\"").unwrap();
        assert_eq!(parsed, Action::Sterilization);
    }

    #[test]
    fn test_unknown_action_is_rejected_by_serde() {
        let result: Result<Action, _> = serde_json::from_str("\"grooming\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_health_and_need_parsing() {
        assert_eq!("needs-attention".parse::<HealthStatus>().unwrap(), HealthStatus::NeedsAttention);
        assert!("emergency".parse::<HealthStatus>().unwrap().is_emergency());
        assert_eq!("medical-treatment".parse::<Need>().unwrap(), Need::MedicalTreatment);

        let err = "sick".parse::<HealthStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown health value: 'sick'");
    }

    #[test]
    fn test_create_check_in_request_defaults_needs() {
        let json = r#"{"animalId":"animal::1","actions":["feeding"],"healthStatus":"good"}"#;
        let request: CreateCheckInRequest = serde_json::from_str(json).unwrap();
        assert!(request.needs.is_empty());
        assert_eq!(request.actions, vec![Action::Feeding]);
    }
}
