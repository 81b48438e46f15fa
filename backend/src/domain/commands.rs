//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod check_ins {
    use crate::domain::engagement_service::EngagementOutcome;
    use crate::domain::models::CheckIn;
    use shared::{Action, HealthStatus, Need};

    /// Input for logging a visit to an animal.
    #[derive(Debug, Clone)]
    pub struct CreateCheckInCommand {
        pub user_id: String,
        pub animal_id: String,
        pub actions: Vec<Action>,
        pub actions_description: Option<String>,
        pub health_status: HealthStatus,
        pub needs: Vec<Need>,
        pub needs_description: Option<String>,
    }

    /// Stored check-in together with what it did to the author's reputation.
    #[derive(Debug, Clone)]
    pub struct CreateCheckInResult {
        pub check_in: CheckIn,
        pub outcome: EngagementOutcome,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCheckInCommand {
        pub check_in_id: String,
        pub requester_id: String,
        pub is_admin: bool,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCheckInResult {
        pub points: i64,
        pub level: i64,
        pub success_message: String,
    }

    /// Page request; missing values fall back to page 1 and the default limit.
    #[derive(Debug, Clone, Default)]
    pub struct CheckInListQuery {
        pub page: Option<u32>,
        pub limit: Option<u32>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PaginationInfo {
        pub current_page: u32,
        pub total_pages: u32,
        pub total: i64,
    }

    #[derive(Debug, Clone)]
    pub struct CheckInListResult {
        pub check_ins: Vec<CheckIn>,
        pub pagination: PaginationInfo,
    }
}

pub mod users {
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub name: String,
    }
}

pub mod animals {
    use shared::HealthStatus;

    /// Register an animal; `discovered_by` is the acting user.
    #[derive(Debug, Clone)]
    pub struct CreateAnimalCommand {
        pub name: String,
        pub description: String,
        pub discovered_by: String,
        pub health: Option<HealthStatus>,
    }
}

pub mod profile {
    use crate::domain::models::{User, UserSummary};
    use crate::domain::streak::StreakSummary;
    use chrono::Weekday;
    use shared::{Action, ExperienceProgress};

    /// Activity statistics derived from a user's check-in history.
    #[derive(Debug, Clone, PartialEq)]
    pub struct UserStatistics {
        pub total_check_ins: i64,
        pub total_unique_animals: i64,
        pub total_discovered: i64,
        /// Most frequent first
        pub action_stats: Vec<(Action, i64)>,
        /// Monday through Sunday
        pub check_ins_by_weekday: Vec<(Weekday, i64)>,
        pub streaks: StreakSummary,
    }

    #[derive(Debug, Clone)]
    pub struct UserProfile {
        pub user: User,
        pub stats: UserStatistics,
        pub progress: ExperienceProgress,
    }

    #[derive(Debug, Clone, Default)]
    pub struct RankingQuery {
        pub limit: Option<u32>,
        pub requester_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct RankingResult {
        pub ranking: Vec<UserSummary>,
        /// Only set when the requester is a known user
        pub user_rank: Option<i64>,
    }
}
