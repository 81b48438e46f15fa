//! # REST API for Animals

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::{error, info};

use super::check_in_apis::check_in_error_response;
use super::mappers::animal_mapper::AnimalMapper;
use super::mappers::check_in_mapper::CheckInMapper;
use super::{error_response, unauthorized, Requester};
use crate::domain::animal_service::AnimalServiceError;
use crate::domain::commands::animals::CreateAnimalCommand;
use crate::domain::commands::check_ins::CheckInListQuery;
use crate::AppState;
use shared::{CreateAnimalRequest, PageQuery};

/// Create a router for animal related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_animal))
        .route("/:id", get(get_animal))
        .route("/:id/check-ins", get(list_animal_check_ins))
}

fn animal_error_response(e: AnimalServiceError) -> Response {
    match e {
        AnimalServiceError::EmptyName
        | AnimalServiceError::NameTooLong(_)
        | AnimalServiceError::DescriptionTooLong(_) => {
            error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
        }
        AnimalServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        AnimalServiceError::Storage(_) => {
            error!("Animal storage failure: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Error accessing animals")
        }
    }
}

/// Register an animal discovered by the calling user
pub async fn create_animal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateAnimalRequest>,
) -> impl IntoResponse {
    info!("POST /api/animals - request: {:?}", request);

    let Some(requester) = Requester::from_headers(&headers) else {
        return unauthorized();
    };

    let command = CreateAnimalCommand {
        name: request.name,
        description: request.description,
        discovered_by: requester.user_id,
        health: request.health,
    };
    match state.animal_service.create_animal(command).await {
        Ok(animal) => (StatusCode::CREATED, Json(AnimalMapper::to_dto(animal))).into_response(),
        Err(e) => animal_error_response(e),
    }
}

pub async fn get_animal(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}", animal_id);

    match state.animal_service.get_animal(&animal_id).await {
        Ok(animal) => (StatusCode::OK, Json(AnimalMapper::to_dto(animal))).into_response(),
        Err(e) => animal_error_response(e),
    }
}

pub async fn list_animal_check_ins(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}/check-ins - page: {:?}", animal_id, page);

    let query = CheckInListQuery { page: page.page, limit: page.limit };
    match state.check_in_service.list_for_animal(&animal_id, query).await {
        Ok(result) => (StatusCode::OK, Json(CheckInMapper::to_list_response(result))).into_response(),
        Err(e) => check_in_error_response(e),
    }
}
