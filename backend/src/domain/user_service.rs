//! User registration and lookup.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::users::CreateUserCommand;
use crate::domain::models::{Achievement, User};
use crate::storage::{Connection, UserStorage};

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name is too long (max {0} characters)")]
    NameTooLong(usize),
    #[error("User {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct UserService<C: Connection> {
    user_repository: C::UserRepository,
}

impl<C: Connection> UserService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
        }
    }

    /// Register a user with zeroed reputation
    pub async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserServiceError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UserServiceError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(UserServiceError::NameTooLong(MAX_NAME_LENGTH));
        }

        let user = User::new(name.to_string(), Utc::now());
        self.user_repository.store_user(&user).await?;
        info!("Registered user {} ({})", user.name, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, UserServiceError> {
        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))
    }

    /// Achievements held by the user in award order
    pub async fn list_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<Achievement>, UserServiceError> {
        Ok(self.get_user(user_id).await?.achievements)
    }
}
