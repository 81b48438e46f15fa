//! Outbound notifications triggered by the engagement cascade.
//!
//! Delivery is fire-and-forget: the engine spawns each call on its own task
//! and only logs failures.

use async_trait::async_trait;
use tracing::info;

use crate::domain::models::{Achievement, Animal, CheckIn, User};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// An animal was reported in an emergency state
    async fn notify_emergency(
        &self,
        animal: &Animal,
        check_in: &CheckIn,
    ) -> Result<(), NotificationError>;

    /// A user unlocked an achievement
    async fn notify_achievement(
        &self,
        user: &User,
        achievement: &Achievement,
    ) -> Result<(), NotificationError>;
}

/// Default notifier that writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_emergency(
        &self,
        animal: &Animal,
        check_in: &CheckIn,
    ) -> Result<(), NotificationError> {
        info!(
            "🚨 Emergency reported for {} ({}) by {} in check-in {}",
            animal.name, animal.id, check_in.user_id, check_in.id
        );
        Ok(())
    }

    async fn notify_achievement(
        &self,
        user: &User,
        achievement: &Achievement,
    ) -> Result<(), NotificationError> {
        info!("🏅 {} unlocked '{}'", user.name, achievement.title);
        Ok(())
    }
}
