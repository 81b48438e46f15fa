use shared::{CheckInListResponse, CreateCheckInResponse, DeleteCheckInResponse};

use super::format_time;
use super::user_mapper::UserMapper;
use crate::domain::commands::check_ins::{CheckInListResult, CreateCheckInResult, DeleteCheckInResult};
use crate::domain::engagement_service::EngagementOutcome;
use crate::domain::models::CheckIn;

pub struct CheckInMapper;

impl CheckInMapper {
    pub fn to_dto(domain: CheckIn) -> shared::CheckIn {
        shared::CheckIn {
            id: domain.id,
            user_id: domain.user_id,
            animal_id: domain.animal_id,
            actions: domain.actions,
            actions_description: domain.actions_description,
            health_status: domain.health_status,
            needs: domain.needs,
            needs_description: domain.needs_description,
            points_earned: domain.points_earned,
            created_at: format_time(&domain.created_at),
        }
    }

    pub fn outcome_to_dto(outcome: EngagementOutcome) -> shared::EngagementOutcome {
        shared::EngagementOutcome {
            points: outcome.points,
            level: outcome.level,
            first_visit: outcome.first_visit,
            new_achievements: UserMapper::achievements_to_dto(outcome.new_achievements),
        }
    }

    pub fn to_create_response(result: CreateCheckInResult) -> CreateCheckInResponse {
        CreateCheckInResponse {
            check_in: Self::to_dto(result.check_in),
            outcome: Self::outcome_to_dto(result.outcome),
        }
    }

    pub fn to_delete_response(result: DeleteCheckInResult) -> DeleteCheckInResponse {
        DeleteCheckInResponse {
            points: result.points,
            level: result.level,
            success_message: result.success_message,
        }
    }

    pub fn to_list_response(result: CheckInListResult) -> CheckInListResponse {
        CheckInListResponse {
            check_ins: result.check_ins.into_iter().map(Self::to_dto).collect(),
            current_page: result.pagination.current_page,
            total_pages: result.pagination.total_pages,
            total_check_ins: result.pagination.total,
        }
    }
}
