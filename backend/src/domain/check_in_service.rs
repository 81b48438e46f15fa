//! Check-in command handling.
//!
//! Stores and removes check-ins and drives the engagement cascade for each
//! one. This is the only caller of [`EngagementService`].

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::commands::check_ins::{
    CheckInListQuery, CheckInListResult, CreateCheckInCommand, CreateCheckInResult,
    DeleteCheckInCommand, DeleteCheckInResult, PaginationInfo,
};
use crate::domain::engagement_service::{EngagementError, EngagementService};
use crate::domain::models::check_in::{dedup_preserving_order, validate_check_in};
use crate::domain::models::{CheckIn, CheckInValidationError};
use crate::domain::notification::Notifier;
use crate::domain::scoring::compute_points;
use crate::storage::{AnimalStorage, CheckInStorage, Connection, UserStorage};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum CheckInServiceError {
    #[error(transparent)]
    Validation(#[from] CheckInValidationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Only the author or an administrator can delete check-in {0}")]
    Forbidden(String),
    #[error(transparent)]
    Engagement(#[from] EngagementError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Resolve a page request into (page, limit, offset)
pub fn page_window(page: Option<u32>, limit: Option<u32>) -> (u32, u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1).saturating_mul(limit))
}

pub fn total_pages(total: i64, limit: u32) -> u32 {
    if total <= 0 {
        return 0;
    }
    let limit = limit.max(1) as i64;
    ((total + limit - 1) / limit) as u32
}

#[derive(Clone)]
pub struct CheckInService<C: Connection> {
    user_repository: C::UserRepository,
    animal_repository: C::AnimalRepository,
    check_in_repository: C::CheckInRepository,
    engagement_service: EngagementService<C>,
}

impl<C: Connection> CheckInService<C> {
    pub fn new(connection: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            animal_repository: connection.create_animal_repository(),
            check_in_repository: connection.create_check_in_repository(),
            engagement_service: EngagementService::new(connection, notifier),
        }
    }

    /// Validate, store and apply a new check-in
    pub async fn create_check_in(
        &self,
        command: CreateCheckInCommand,
    ) -> Result<CreateCheckInResult, CheckInServiceError> {
        info!("Creating check-in by {} for animal {}", command.user_id, command.animal_id);

        validate_check_in(
            &command.actions,
            command.actions_description.as_deref(),
            command.needs_description.as_deref(),
        )?;

        let user = self
            .user_repository
            .get_user(&command.user_id)
            .await?
            .ok_or_else(|| CheckInServiceError::NotFound(format!("User {}", command.user_id)))?;
        let animal = self
            .animal_repository
            .get_animal(&command.animal_id)
            .await?
            .ok_or_else(|| CheckInServiceError::NotFound(format!("Animal {}", command.animal_id)))?;

        let actions = dedup_preserving_order(&command.actions);
        let check_in = CheckIn {
            id: CheckIn::generate_id(),
            user_id: user.id.clone(),
            animal_id: animal.id.clone(),
            points_earned: compute_points(&actions),
            actions,
            actions_description: command.actions_description,
            health_status: command.health_status,
            needs: dedup_preserving_order(&command.needs),
            needs_description: command.needs_description,
            created_at: Utc::now(),
            applied_at: None,
            reversed_at: None,
        };

        self.check_in_repository.store_check_in(&check_in).await?;
        info!("Stored check-in {} worth {} points", check_in.id, check_in.points_earned);

        let outcome = self
            .engagement_service
            .on_check_in_created(&check_in, &user, &animal)
            .await?;

        // Return the stored state, including the applied marker
        let check_in = match self.check_in_repository.get_check_in(&check_in.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => check_in,
            Err(e) => {
                warn!("Could not reload check-in {}: {:#}", check_in.id, e);
                check_in
            }
        };

        Ok(CreateCheckInResult { check_in, outcome })
    }

    /// Reverse and remove a check-in
    pub async fn delete_check_in(
        &self,
        command: DeleteCheckInCommand,
    ) -> Result<DeleteCheckInResult, CheckInServiceError> {
        info!("Deleting check-in {} requested by {}", command.check_in_id, command.requester_id);

        let check_in = self.get_check_in(&command.check_in_id).await?;
        if !command.is_admin && check_in.user_id != command.requester_id {
            warn!(
                "User {} tried to delete check-in {} owned by {}",
                command.requester_id, check_in.id, check_in.user_id
            );
            return Err(CheckInServiceError::Forbidden(check_in.id));
        }

        let author = self
            .user_repository
            .get_user(&check_in.user_id)
            .await?
            .ok_or_else(|| CheckInServiceError::NotFound(format!("User {}", check_in.user_id)))?;

        let reversal = self
            .engagement_service
            .on_check_in_deleted(&check_in, &author)
            .await?;

        if !self.check_in_repository.delete_check_in(&check_in.id).await? {
            // Removed concurrently after the reversal; the points are already settled
            error!("Check-in {} disappeared before it could be deleted", check_in.id);
        }

        Ok(DeleteCheckInResult {
            points: reversal.points,
            level: reversal.level,
            success_message: format!("Check-in {} deleted", check_in.id),
        })
    }

    pub async fn get_check_in(&self, check_in_id: &str) -> Result<CheckIn, CheckInServiceError> {
        self.check_in_repository
            .get_check_in(check_in_id)
            .await?
            .ok_or_else(|| CheckInServiceError::NotFound(format!("Check-in {}", check_in_id)))
    }

    /// A user's check-ins, newest first
    pub async fn list_for_user(
        &self,
        user_id: &str,
        query: CheckInListQuery,
    ) -> Result<CheckInListResult, CheckInServiceError> {
        if self.user_repository.get_user(user_id).await?.is_none() {
            return Err(CheckInServiceError::NotFound(format!("User {}", user_id)));
        }

        let (page, limit, offset) = page_window(query.page, query.limit);
        let total = self.check_in_repository.count_for_user(user_id).await?;
        let check_ins = self.check_in_repository.list_for_user(user_id, limit, offset).await?;

        Ok(CheckInListResult {
            check_ins,
            pagination: PaginationInfo {
                current_page: page,
                total_pages: total_pages(total, limit),
                total,
            },
        })
    }

    /// An animal's check-ins, newest first
    pub async fn list_for_animal(
        &self,
        animal_id: &str,
        query: CheckInListQuery,
    ) -> Result<CheckInListResult, CheckInServiceError> {
        if self.animal_repository.get_animal(animal_id).await?.is_none() {
            return Err(CheckInServiceError::NotFound(format!("Animal {}", animal_id)));
        }

        let (page, limit, offset) = page_window(query.page, query.limit);
        let total = self.check_in_repository.count_for_animal(animal_id).await?;
        let check_ins = self.check_in_repository.list_for_animal(animal_id, limit, offset).await?;

        Ok(CheckInListResult {
            check_ins,
            pagination: PaginationInfo {
                current_page: page,
                total_pages: total_pages(total, limit),
                total,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Animal, CheckInState, User};
    use crate::domain::notification::LoggingNotifier;
    use crate::storage::test_utils::TestEnvironment;
    use crate::storage::DbConnection;
    use shared::{Action, HealthStatus, Need};

    async fn setup() -> anyhow::Result<(TestEnvironment, CheckInService<DbConnection>, User, Animal)> {
        let env = TestEnvironment::new().await?;
        let service = CheckInService::new(Arc::new(env.connection.clone()), Arc::new(LoggingNotifier));
        let user = env.create_test_user("Ana").await?;
        let animal = env.create_test_animal("Mingau", &user.id).await?;
        Ok((env, service, user, animal))
    }

    fn command(user: &User, animal: &Animal, actions: Vec<Action>) -> CreateCheckInCommand {
        CreateCheckInCommand {
            user_id: user.id.clone(),
            animal_id: animal.id.clone(),
            actions,
            actions_description: Some("Left food and fresh water".to_string()),
            health_status: HealthStatus::Good,
            needs: vec![Need::Shelter],
            needs_description: None,
        }
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(2), Some(500)), (2, 100, 100));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[tokio::test]
    async fn test_create_check_in_applies_engagement() -> anyhow::Result<()> {
        let (_env, service, user, animal) = setup().await?;

        let result = service
            .create_check_in(command(&user, &animal, vec![Action::Feeding, Action::Watering, Action::Feeding]))
            .await?;

        assert_eq!(result.check_in.actions, vec![Action::Feeding, Action::Watering]);
        assert_eq!(result.check_in.points_earned, 21);
        assert_eq!(result.check_in.state(), CheckInState::Applied);
        assert_eq!(result.outcome.points, 21);
        assert!(result.outcome.first_visit);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_check_in_validation() -> anyhow::Result<()> {
        let (_env, service, user, animal) = setup().await?;

        let err = service.create_check_in(command(&user, &animal, Vec::new())).await.unwrap_err();
        assert!(matches!(err, CheckInServiceError::Validation(CheckInValidationError::EmptyActions)));

        let mut long = command(&user, &animal, vec![Action::Feeding]);
        long.actions_description = Some("x".repeat(501));
        let err = service.create_check_in(long).await.unwrap_err();
        assert!(matches!(err, CheckInServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_check_in_unknown_subjects() -> anyhow::Result<()> {
        let (_env, service, user, animal) = setup().await?;

        let mut unknown_animal = command(&user, &animal, vec![Action::Feeding]);
        unknown_animal.animal_id = "animal::missing".to_string();
        assert!(matches!(
            service.create_check_in(unknown_animal).await.unwrap_err(),
            CheckInServiceError::NotFound(_)
        ));

        let mut unknown_user = command(&user, &animal, vec![Action::Feeding]);
        unknown_user.user_id = "user::missing".to_string();
        assert!(matches!(
            service.create_check_in(unknown_user).await.unwrap_err(),
            CheckInServiceError::NotFound(_)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_by_author_restores_points() -> anyhow::Result<()> {
        let (env, service, user, animal) = setup().await?;
        service.create_check_in(command(&user, &animal, vec![Action::Feeding])).await?;
        let created = service
            .create_check_in(command(&user, &animal, vec![Action::Sterilization, Action::Vaccination]))
            .await?;
        assert_eq!(created.outcome.points, 10 + 70);

        let result = service
            .delete_check_in(DeleteCheckInCommand {
                check_in_id: created.check_in.id.clone(),
                requester_id: user.id.clone(),
                is_admin: false,
            })
            .await?;

        assert_eq!(result.points, 10);
        assert_eq!(result.level, 1);
        assert!(matches!(
            service.get_check_in(&created.check_in.id).await.unwrap_err(),
            CheckInServiceError::NotFound(_)
        ));
        let stored = env.connection.create_user_repository().get_user(&user.id).await?.unwrap();
        assert_eq!(stored.points, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_requires_author_or_admin() -> anyhow::Result<()> {
        let (env, service, user, animal) = setup().await?;
        let other = env.create_test_user("Bia").await?;
        let created = service.create_check_in(command(&user, &animal, vec![Action::Feeding])).await?;

        let err = service
            .delete_check_in(DeleteCheckInCommand {
                check_in_id: created.check_in.id.clone(),
                requester_id: other.id.clone(),
                is_admin: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckInServiceError::Forbidden(_)));

        let result = service
            .delete_check_in(DeleteCheckInCommand {
                check_in_id: created.check_in.id.clone(),
                requester_id: other.id.clone(),
                is_admin: true,
            })
            .await?;
        assert_eq!(result.points, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_check_in() -> anyhow::Result<()> {
        let (_env, service, user, _animal) = setup().await?;
        let err = service
            .delete_check_in(DeleteCheckInCommand {
                check_in_id: "checkin::missing".to_string(),
                requester_id: user.id.clone(),
                is_admin: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckInServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_pages() -> anyhow::Result<()> {
        let (env, service, user, animal) = setup().await?;
        let other_animal = env.create_test_animal("Frajola", &user.id).await?;
        for _ in 0..12 {
            service.create_check_in(command(&user, &animal, vec![Action::Feeding])).await?;
        }
        service.create_check_in(command(&user, &other_animal, vec![Action::Watering])).await?;

        let first = service.list_for_user(&user.id, CheckInListQuery::default()).await?;
        assert_eq!(first.check_ins.len(), 10);
        assert_eq!(first.pagination, PaginationInfo { current_page: 1, total_pages: 2, total: 13 });
        assert_eq!(first.check_ins[0].animal_id, other_animal.id);

        let second = service
            .list_for_user(&user.id, CheckInListQuery { page: Some(2), limit: None })
            .await?;
        assert_eq!(second.check_ins.len(), 3);

        let by_animal = service
            .list_for_animal(&animal.id, CheckInListQuery { page: None, limit: Some(5) })
            .await?;
        assert_eq!(by_animal.pagination, PaginationInfo { current_page: 1, total_pages: 3, total: 12 });

        assert!(matches!(
            service.list_for_user("user::missing", CheckInListQuery::default()).await.unwrap_err(),
            CheckInServiceError::NotFound(_)
        ));
        Ok(())
    }
}
