//! # StrayHelp Backend
//!
//! Check-in, reputation and achievement service for volunteers caring for
//! stray animals.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, axum)
//!     ↓
//! Domain Layer (engagement engine, services, pure calculators)
//!     ↓
//! Storage Layer (SQLite via sqlx)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domain::{AnimalService, CheckInService, LoggingNotifier, Notifier, ProfileService, UserService};
use crate::io::rest::{animal_apis, check_in_apis, engagement_apis, user_apis, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService<DbConnection>,
    pub animal_service: AnimalService<DbConnection>,
    pub check_in_service: CheckInService<DbConnection>,
    pub profile_service: ProfileService<DbConnection>,
}

impl AppState {
    pub fn new(connection: Arc<DbConnection>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            user_service: UserService::new(connection.clone()),
            animal_service: AnimalService::new(connection.clone()),
            check_in_service: CheckInService::new(connection.clone(), notifier),
            profile_service: ProfileService::new(connection),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let connection = DbConnection::from_config(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up application state");
    Ok(AppState::new(Arc::new(connection), Arc::new(LoggingNotifier)))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    let api_routes = Router::new()
        .nest("/users", user_apis::router())
        .nest("/animals", animal_apis::router())
        .nest("/check-ins", check_in_apis::router())
        .nest("/engagement", engagement_apis::router())
        .route("/ranking", get(user_apis::get_ranking));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{read_json, send, setup_test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use clap::Parser;
    use serde_json::json;
    use shared::{CreateCheckInResponse, RankingResponse, User, UserProfileResponse};

    fn test_config() -> Config {
        Config::parse_from(["strayhelp-backend"])
    }

    fn post(uri: &str, user_id: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, user_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_is_rejected() {
        let (_env, state) = setup_test_state().await;
        let mut config = test_config();
        config.cors_origin = "bad\norigin".to_string();
        assert!(create_router(state, &config).is_err());
    }

    #[tokio::test]
    async fn test_full_check_in_flow_through_router() {
        let (_env, state) = setup_test_state().await;
        let app = create_router(state, &test_config()).unwrap();

        let ana: User = read_json(send(&app, post("/api/users", None, json!({ "name": "Ana" }))).await).await;
        let bia: User = read_json(send(&app, post("/api/users", None, json!({ "name": "Bia" }))).await).await;

        let response = send(
            &app,
            post("/api/animals", Some(&ana.id), json!({ "name": "Mingau", "description": "White cat" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let animal: shared::Animal = read_json(response).await;

        let body = json!({ "animalId": animal.id, "actions": ["sterilization"], "healthStatus": "emergency" });
        let response = send(&app, post("/api/check-ins", Some(&bia.id), body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: CreateCheckInResponse = read_json(response).await;
        assert_eq!(created.outcome.points, 40);

        let animal_now: shared::Animal =
            read_json(send(&app, get(&format!("/api/animals/{}", animal.id), None)).await).await;
        assert_eq!(animal_now.visit_count, 1);
        assert_eq!(animal_now.health, shared::HealthStatus::Emergency);

        let profile: UserProfileResponse =
            read_json(send(&app, get(&format!("/api/users/{}", bia.id), None)).await).await;
        assert_eq!(profile.user.points, 40);
        assert_eq!(profile.user.total_animals_helped, 1);
        assert_eq!(profile.user.achievements.len(), 1);
        assert_eq!(profile.stats.total_discovered, 0);

        let ranking: RankingResponse = read_json(send(&app, get("/api/ranking", Some(&ana.id))).await).await;
        assert_eq!(ranking.ranking[0].id, bia.id);
        assert_eq!(ranking.user_rank, Some(2));
    }
}
