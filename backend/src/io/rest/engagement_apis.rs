//! # REST API for the engagement calculators
//!
//! Stateless endpoints exposing scoring, levels and streaks.

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::error_response;
use crate::domain::level::{experience_progress, level_for, points_to_next_level, MAX_POINTS};
use crate::domain::scoring::compute_points;
use crate::domain::streak::calculate_streaks;
use crate::AppState;
use shared::{ComputePointsRequest, ComputePointsResponse, LevelResponse, StreakRequest, StreakResponse};

/// Create a router for the calculator APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/points", post(compute_points_for_actions))
        .route("/levels/:points", get(get_level))
        .route("/streaks", post(compute_streaks))
}

pub async fn compute_points_for_actions(Json(request): Json<ComputePointsRequest>) -> impl IntoResponse {
    info!("POST /api/engagement/points - request: {:?}", request);

    let points = compute_points(&request.actions);
    (StatusCode::OK, Json(ComputePointsResponse { points }))
}

pub async fn get_level(Path(points): Path<i64>) -> impl IntoResponse {
    info!("GET /api/engagement/levels/{}", points);

    if points < 0 {
        return error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Points cannot be negative");
    }
    if points > MAX_POINTS {
        return error_response(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Points cannot exceed {}", MAX_POINTS),
        );
    }

    let level = level_for(points);
    let response = LevelResponse {
        points,
        level,
        points_to_next_level: points_to_next_level(level),
        progress: experience_progress(points, level),
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn compute_streaks(Json(request): Json<StreakRequest>) -> impl IntoResponse {
    info!("POST /api/engagement/streaks - {} dates", request.dates.len());

    let mut dates = Vec::with_capacity(request.dates.len());
    for raw in &request.dates {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => dates.push(date.with_timezone(&Utc)),
            Err(e) => {
                error!("Invalid streak date '{}': {}", raw, e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Invalid RFC 3339 timestamp: '{}'", raw),
                );
            }
        }
    }

    let summary = calculate_streaks(&dates);
    let response = StreakResponse {
        current_streak: summary.current_streak,
        longest_streak: summary.longest_streak,
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{read_json, send, setup_test_state};
    use axum::{body::Body, http::{Method, Request}};
    use chrono::Duration;
    use serde_json::json;

    async fn app() -> (crate::storage::test_utils::TestEnvironment, Router) {
        let (env, state) = setup_test_state().await;
        (env, router().with_state(state))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_points_endpoint() {
        let (_env, app) = app().await;

        let cases = vec![
            (json!({ "actions": [] }), 5),
            (json!({}), 5),
            (json!({ "actions": ["feeding"] }), 10),
            (json!({ "actions": ["feeding", "watering"] }), 21),
            (json!({ "actions": ["vaccination"] }), 30),
            (json!({ "actions": ["veterinary", "vaccination"] }), 64),
        ];
        for (body, expected) in cases {
            let response = send(&app, post_json("/points", body.clone())).await;
            assert_eq!(response.status(), StatusCode::OK);
            let result: ComputePointsResponse = read_json(response).await;
            assert_eq!(result.points, expected, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_level_endpoint() {
        let (_env, app) = app().await;

        let response = send(&app, Request::builder().uri("/levels/450").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let level: LevelResponse = read_json(response).await;
        assert_eq!(level.level, 3);
        assert_eq!(level.points_to_next_level, 500);
        assert_eq!(level.progress.points_in_current_level, 50);
        assert_eq!(level.progress.progress_percentage, 10);
        assert_eq!(level.progress.total_points_needed, 900);

        let response = send(&app, Request::builder().uri("/levels/-5").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_level_endpoint_bounds() {
        let (_env, app) = app().await;

        let uri = format!("/levels/{}", MAX_POINTS);
        let response = send(&app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let level: LevelResponse = read_json(response).await;
        assert_eq!(level.progress.total_points_needed, MAX_POINTS + 1);

        let uri = format!("/levels/{}", MAX_POINTS + 1);
        let response = send(&app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            Request::builder().uri("/levels/9223372036854775807").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_streaks_endpoint() {
        let (_env, app) = app().await;
        let now = Utc::now();
        let dates: Vec<String> = [0, 1, 2]
            .iter()
            .map(|d| (now - Duration::days(*d)).to_rfc3339())
            .collect();

        let response = send(&app, post_json("/streaks", json!({ "dates": dates }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let streaks: StreakResponse = read_json(response).await;
        assert_eq!(streaks, StreakResponse { current_streak: 3, longest_streak: 3 });

        let response = send(&app, post_json("/streaks", json!({ "dates": ["yesterday"] }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
