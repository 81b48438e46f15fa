//! Animal registration and lookup. Visit aggregates are left to the
//! engagement engine.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::animals::CreateAnimalCommand;
use crate::domain::models::Animal;
use crate::storage::{AnimalStorage, Connection, UserStorage};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum AnimalServiceError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name is too long (max {0} characters)")]
    NameTooLong(usize),
    #[error("Description is too long (max {0} characters)")]
    DescriptionTooLong(usize),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AnimalService<C: Connection> {
    user_repository: C::UserRepository,
    animal_repository: C::AnimalRepository,
}

impl<C: Connection> AnimalService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            animal_repository: connection.create_animal_repository(),
        }
    }

    /// Register an animal with no visits yet
    pub async fn create_animal(
        &self,
        command: CreateAnimalCommand,
    ) -> Result<Animal, AnimalServiceError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(AnimalServiceError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AnimalServiceError::NameTooLong(MAX_NAME_LENGTH));
        }
        if command.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AnimalServiceError::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
        }
        if self.user_repository.get_user(&command.discovered_by).await?.is_none() {
            return Err(AnimalServiceError::NotFound(format!("User {}", command.discovered_by)));
        }

        let animal = Animal {
            id: Animal::generate_id(),
            name: name.to_string(),
            description: command.description,
            discovered_by: command.discovered_by,
            health: command.health.unwrap_or_default(),
            needs: Vec::new(),
            needs_description: None,
            visit_count: 0,
            last_visit_at: None,
            created_at: Utc::now(),
        };
        self.animal_repository.store_animal(&animal).await?;
        info!(
            "Registered animal {} ({}) discovered by {}",
            animal.name, animal.id, animal.discovered_by
        );
        Ok(animal)
    }

    pub async fn get_animal(&self, animal_id: &str) -> Result<Animal, AnimalServiceError> {
        self.animal_repository
            .get_animal(animal_id)
            .await?
            .ok_or_else(|| AnimalServiceError::NotFound(format!("Animal {}", animal_id)))
    }
}
