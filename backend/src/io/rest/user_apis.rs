//! # REST API for Users
//!
//! Registration, profile, statistics, achievements and ranking.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use super::check_in_apis::check_in_error_response;
use super::mappers::check_in_mapper::CheckInMapper;
use super::mappers::user_mapper::UserMapper;
use super::{error_response, Requester};
use crate::domain::commands::check_ins::CheckInListQuery;
use crate::domain::commands::profile::RankingQuery;
use crate::domain::commands::users::CreateUserCommand;
use crate::domain::profile_service::ProfileServiceError;
use crate::domain::user_service::UserServiceError;
use crate::AppState;
use shared::{CreateUserRequest, PageQuery};

/// Create a router for user related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user_profile))
        .route("/:id/stats", get(get_user_stats))
        .route("/:id/achievements", get(list_achievements))
        .route("/:id/check-ins", get(list_user_check_ins))
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub limit: Option<u32>,
}

fn user_error_response(e: UserServiceError) -> Response {
    match e {
        UserServiceError::EmptyName | UserServiceError::NameTooLong(_) => {
            error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
        }
        UserServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        UserServiceError::Storage(_) => {
            error!("User storage failure: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Error accessing users")
        }
    }
}

fn profile_error_response(e: ProfileServiceError) -> Response {
    match e {
        ProfileServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        ProfileServiceError::Storage(_) => {
            error!("Profile storage failure: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Error computing profile")
        }
    }
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - request: {:?}", request);

    let command = CreateUserCommand { name: request.name };
    match state.user_service.create_user(command).await {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => user_error_response(e),
    }
}

/// User with statistics and level progress
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}", user_id);

    match state.profile_service.get_user_profile(&user_id).await {
        Ok(profile) => (StatusCode::OK, Json(UserMapper::to_profile_response(profile))).into_response(),
        Err(e) => profile_error_response(e),
    }
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/stats", user_id);

    match state.profile_service.get_user_stats(&user_id).await {
        Ok(stats) => (StatusCode::OK, Json(UserMapper::stats_to_dto(stats))).into_response(),
        Err(e) => profile_error_response(e),
    }
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/achievements", user_id);

    match state.user_service.list_achievements(&user_id).await {
        Ok(achievements) => (StatusCode::OK, Json(UserMapper::achievements_to_dto(achievements))).into_response(),
        Err(e) => user_error_response(e),
    }
}

pub async fn list_user_check_ins(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/check-ins - page: {:?}", user_id, page);

    let query = CheckInListQuery { page: page.page, limit: page.limit };
    match state.check_in_service.list_for_user(&user_id, query).await {
        Ok(result) => (StatusCode::OK, Json(CheckInMapper::to_list_response(result))).into_response(),
        Err(e) => check_in_error_response(e),
    }
}

/// Leaderboard; the caller's own rank is included when `X-User-Id` is sent
pub async fn get_ranking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RankingParams>,
) -> impl IntoResponse {
    info!("GET /api/ranking - limit: {:?}", params.limit);

    let query = RankingQuery {
        limit: params.limit,
        requester_id: Requester::from_headers(&headers).map(|r| r.user_id),
    };
    match state.profile_service.get_ranking(query).await {
        Ok(result) => (StatusCode::OK, Json(UserMapper::to_ranking_response(result))).into_response(),
        Err(e) => profile_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{read_json, send, setup_test_state};
    use crate::io::rest::USER_ID_HEADER;
    use crate::storage::Connection;
    use crate::storage::UserStorage;
    use axum::{body::Body, http::{Method, Request}};
    use serde_json::json;
    use shared::{RankingResponse, User, UserProfileResponse};

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_and_get_profile() {
        let (_env, state) = setup_test_state().await;
        let app = router().with_state(state);

        let response = send(&app, json_request(Method::POST, "/", json!({ "name": "Ana" }))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: User = read_json(response).await;
        assert_eq!((user.points, user.level), (0, 1));

        let response = send(&app, get(&format!("/{}", user.id))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let profile: UserProfileResponse = read_json(response).await;
        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.stats.total_check_ins, 0);
        assert_eq!(profile.stats.check_ins_by_weekday.len(), 7);
        assert_eq!(profile.progress.next_level, 2);
    }

    #[tokio::test]
    async fn test_create_user_rejects_blank_name() {
        let (_env, state) = setup_test_state().await;
        let app = router().with_state(state);

        let response = send(&app, json_request(Method::POST, "/", json!({ "name": "  " }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (_env, state) = setup_test_state().await;
        let app = router().with_state(state);

        for uri in ["/user::missing", "/user::missing/stats", "/user::missing/achievements", "/user::missing/check-ins"] {
            let response = send(&app, get(uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_ranking_includes_requester_rank() {
        let (env, state) = setup_test_state().await;
        let users = env.connection.create_user_repository();
        let ana = env.create_test_user("Ana").await.unwrap();
        let bia = env.create_test_user("Bia").await.unwrap();
        users.adjust_points(&bia.id, 250).await.unwrap();

        let app = Router::new().route("/ranking", axum::routing::get(get_ranking)).with_state(state);
        let request = Request::builder()
            .uri("/ranking?limit=5")
            .header(USER_ID_HEADER, ana.id.as_str())
            .body(Body::empty())
            .unwrap();

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let ranking: RankingResponse = read_json(response).await;
        assert_eq!(ranking.ranking[0].id, bia.id);
        assert_eq!(ranking.user_rank, Some(2));
    }
}
