/// Test utilities for storage-backed tests
///
/// Each environment gets its own SQLite file in a temporary directory which
/// is removed when the environment is dropped, even if the test panics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{Action, HealthStatus};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::domain::models::{Animal, CheckIn, User};
use crate::storage::connection::DbConnection;
use crate::storage::traits::{AnimalStorage, Connection, UserStorage};

pub struct TestEnvironment {
    pub connection: DbConnection,
    /// Database file path for manual inspection if needed
    pub db_path: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("strayhelp-test.db");
        let connection = DbConnection::open_path(&db_path).await?;
        Ok(Self {
            connection,
            db_path,
            _temp_dir: temp_dir,
        })
    }

    /// Store a fresh user with zeroed aggregates
    pub async fn create_test_user(&self, name: &str) -> Result<User> {
        let user = User::new(name.to_string(), Utc::now());
        self.connection.create_user_repository().store_user(&user).await?;
        Ok(user)
    }

    /// Store an animal discovered by `discovered_by` with no visits yet
    pub async fn create_test_animal(&self, name: &str, discovered_by: &str) -> Result<Animal> {
        let animal = Animal {
            id: Animal::generate_id(),
            name: name.to_string(),
            description: format!("{} lives near the bakery", name),
            discovered_by: discovered_by.to_string(),
            health: HealthStatus::Regular,
            needs: Vec::new(),
            needs_description: None,
            visit_count: 0,
            last_visit_at: None,
            created_at: Utc::now(),
        };
        self.connection.create_animal_repository().store_animal(&animal).await?;
        Ok(animal)
    }

    /// A pending feeding check-in; not stored
    pub fn sample_check_in(
        &self,
        user_id: &str,
        animal_id: &str,
        created_at: DateTime<Utc>,
    ) -> CheckIn {
        CheckIn {
            id: CheckIn::generate_id(),
            user_id: user_id.to_string(),
            animal_id: animal_id.to_string(),
            actions: vec![Action::Feeding],
            actions_description: None,
            health_status: HealthStatus::Good,
            needs: Vec::new(),
            needs_description: None,
            points_earned: 10,
            created_at,
            applied_at: None,
            reversed_at: None,
        }
    }
}
