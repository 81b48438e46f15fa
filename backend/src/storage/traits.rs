//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Every method is a single
//! persistence write or read; the reputation counters are only ever changed
//! through the atomic primitives here, never by read-modify-write in memory.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{Achievement, Animal, AnimalVisit, CheckIn, User, UserSummary};

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Store a new user
    async fn store_user(&self, user: &User) -> Result<()>;

    /// Retrieve a user, including achievements in award order
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Atomically add `delta` to the user's points (floored at zero) and return
    /// the new total. Returns `None` if the user does not exist.
    async fn adjust_points(&self, user_id: &str, delta: i64) -> Result<Option<i64>>;

    /// Write `level` only if the stored points still equal `points`.
    /// Returns false when a concurrent adjustment got there first.
    async fn set_level_if_points(&self, user_id: &str, level: i64, points: i64) -> Result<bool>;

    /// Record that `user_id` has helped `animal_id`. The first time a pair is
    /// seen the user's helped-animals counter is incremented in the same
    /// transaction and the new total is returned; afterwards `None`.
    async fn record_animal_helped(&self, user_id: &str, animal_id: &str) -> Result<Option<i64>>;

    /// Insert the achievement unless the user already holds that title.
    /// Returns true if it was inserted.
    async fn award_achievement(&self, user_id: &str, achievement: &Achievement) -> Result<bool>;

    /// Achievements held by the user in award order
    async fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>>;

    /// Top users by points, highest first
    async fn list_top_users(&self, limit: u32) -> Result<Vec<UserSummary>>;

    /// Number of users with strictly more points than `points`
    async fn count_users_with_more_points(&self, points: i64) -> Result<i64>;
}

/// Trait defining the interface for animal storage operations
#[async_trait]
pub trait AnimalStorage: Send + Sync {
    /// Store a new animal
    async fn store_animal(&self, animal: &Animal) -> Result<()>;

    /// Retrieve a specific animal by ID
    async fn get_animal(&self, animal_id: &str) -> Result<Option<Animal>>;

    /// Apply the visit of an applied check-in: set last visit time, overwrite
    /// health/needs and increment the visit counter. The check-in's visit
    /// marker is set in the same transaction, so each check-in lands once.
    /// Returns false if the visit was already recorded or the check-in is not
    /// applied; errors if the animal does not exist.
    async fn record_visit(
        &self,
        check_in_id: &str,
        animal_id: &str,
        visit: &AnimalVisit,
    ) -> Result<bool>;

    /// Number of animals first registered by the user
    async fn count_discovered_by(&self, user_id: &str) -> Result<i64>;
}

/// Trait defining the interface for check-in storage operations
#[async_trait]
pub trait CheckInStorage: Send + Sync {
    /// Store a new, pending check-in
    async fn store_check_in(&self, check_in: &CheckIn) -> Result<()>;

    /// Retrieve a specific check-in by ID
    async fn get_check_in(&self, check_in_id: &str) -> Result<Option<CheckIn>>;

    /// Delete a check-in. Returns true if it existed.
    async fn delete_check_in(&self, check_in_id: &str) -> Result<bool>;

    /// Pending -> Applied. Returns true only for the caller that made the transition.
    async fn mark_applied(&self, check_in_id: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Undo `mark_applied` for a check-in whose points never landed
    async fn clear_applied(&self, check_in_id: &str) -> Result<bool>;

    /// Applied -> Reversed. Returns true only for the caller that made the transition.
    async fn mark_reversed(&self, check_in_id: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Undo `mark_reversed` for a check-in whose points were never taken back
    async fn clear_reversed(&self, check_in_id: &str) -> Result<bool>;

    /// Number of check-ins logged by the user
    async fn count_for_user(&self, user_id: &str) -> Result<i64>;

    /// Number of the user's check-ins whose points are currently credited
    async fn count_applied_for_user(&self, user_id: &str) -> Result<i64>;

    /// Number of check-ins logged for the animal
    async fn count_for_animal(&self, animal_id: &str) -> Result<i64>;

    /// Number of distinct animals the user has check-ins for
    async fn count_distinct_animals_for_user(&self, user_id: &str) -> Result<i64>;

    /// A page of the user's check-ins, newest first
    async fn list_for_user(&self, user_id: &str, limit: u32, offset: u32) -> Result<Vec<CheckIn>>;

    /// A page of the animal's check-ins, newest first
    async fn list_for_animal(
        &self,
        animal_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CheckIn>>;

    /// Every check-in of the user, newest first (for statistics)
    async fn list_all_for_user(&self, user_id: &str) -> Result<Vec<CheckIn>>;
}

/// Trait defining the interface for storage connections
///
/// Provides factory methods for the repositories so services can be written
/// against any backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type UserRepository: UserStorage + Clone + 'static;
    type AnimalRepository: AnimalStorage + Clone + 'static;
    type CheckInRepository: CheckInStorage + Clone + 'static;

    fn create_user_repository(&self) -> Self::UserRepository;
    fn create_animal_repository(&self) -> Self::AnimalRepository;
    fn create_check_in_repository(&self) -> Self::CheckInRepository;
}
