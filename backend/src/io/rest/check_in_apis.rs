//! # REST API for Check-ins
//!
//! Creating a check-in applies its points, level, first-visit and achievement
//! effects before responding; deleting one takes its points back.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::{error, info};

use super::mappers::check_in_mapper::CheckInMapper;
use super::{error_response, unauthorized, Requester};
use crate::domain::check_in_service::CheckInServiceError;
use crate::domain::commands::check_ins::{CreateCheckInCommand, DeleteCheckInCommand};
use crate::domain::engagement_service::EngagementError;
use crate::AppState;
use shared::CreateCheckInRequest;

/// Create a router for check-in related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_check_in))
        .route("/:id", get(get_check_in).delete(delete_check_in))
}

pub(crate) fn check_in_error_response(e: CheckInServiceError) -> Response {
    match &e {
        CheckInServiceError::Validation(_) => {
            error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
        }
        CheckInServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        CheckInServiceError::Forbidden(_) => error_response(StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string()),
        CheckInServiceError::Engagement(EngagementError::Persistence { check_in_id, step, .. }) => {
            error!("Engagement update failed for check-in {} at '{}': {:#}", check_in_id, step, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENGAGEMENT_ERROR",
                format!("Failed to update reputation for check-in {}", check_in_id),
            )
        }
        CheckInServiceError::Engagement(EngagementError::Notification(_)) | CheckInServiceError::Storage(_) => {
            error!("Check-in request failed: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Error processing check-in")
        }
    }
}

/// Log a visit to an animal as the calling user
pub async fn create_check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCheckInRequest>,
) -> impl IntoResponse {
    info!("POST /api/check-ins - request: {:?}", request);

    let Some(requester) = Requester::from_headers(&headers) else {
        return unauthorized();
    };

    let command = CreateCheckInCommand {
        user_id: requester.user_id,
        animal_id: request.animal_id,
        actions: request.actions,
        actions_description: request.actions_description,
        health_status: request.health_status,
        needs: request.needs,
        needs_description: request.needs_description,
    };

    match state.check_in_service.create_check_in(command).await {
        Ok(result) => (StatusCode::CREATED, Json(CheckInMapper::to_create_response(result))).into_response(),
        Err(e) => check_in_error_response(e),
    }
}

pub async fn get_check_in(
    State(state): State<AppState>,
    Path(check_in_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/check-ins/{}", check_in_id);

    match state.check_in_service.get_check_in(&check_in_id).await {
        Ok(check_in) => (StatusCode::OK, Json(CheckInMapper::to_dto(check_in))).into_response(),
        Err(e) => check_in_error_response(e),
    }
}

/// Delete a check-in; only its author or an administrator may do so
pub async fn delete_check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(check_in_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/check-ins/{}", check_in_id);

    let Some(requester) = Requester::from_headers(&headers) else {
        return unauthorized();
    };

    let command = DeleteCheckInCommand {
        check_in_id,
        requester_id: requester.user_id,
        is_admin: requester.is_admin,
    };

    match state.check_in_service.delete_check_in(command).await {
        Ok(result) => (StatusCode::OK, Json(CheckInMapper::to_delete_response(result))).into_response(),
        Err(e) => check_in_error_response(e),
    }
}
