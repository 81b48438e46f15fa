//! Engagement engine: keeps the reputation aggregates consistent with the
//! check-ins that produced them.
//!
//! This service is the only writer of `User.points`, `User.level`,
//! `User.total_animals_helped`, the animal visit fields and user achievements.
//! It is invoked explicitly by the check-in command handler after a check-in
//! is stored and before one is removed.
//!
//! Every step is its own persistence write. The check-in's applied/reversed
//! markers make the point credit happen at most once per check-in, so the
//! whole cascade can be retried after a failure:
//!
//! 1. Claim the check-in (Pending -> Applied). Only the claimant credits points.
//! 2. Credit `points_earned` with an atomic increment-and-refetch.
//! 3. Write the level derived from the returned points (conditional on points).
//! 4. Push the visit onto the animal, at most once per check-in.
//! 5. Record the (user, animal) pair; the first time it is seen the user's
//!    helped-animals counter goes up by one.
//! 6. Evaluate and award achievements (insert-if-absent). Failures are logged
//!    and never fail the cascade.
//! 7. Fan out notifications on detached tasks.

use anyhow::anyhow;
use chrono::Utc;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::achievements::{self, AchievementError};
use crate::domain::level::level_for;
use crate::domain::models::{Achievement, Animal, CheckIn, User};
use crate::domain::notification::{NotificationError, Notifier};
use crate::storage::{AnimalStorage, CheckInStorage, Connection, UserStorage};

/// Cascade step a persistence failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Claim,
    Points,
    Level,
    AnimalVisit,
    FirstVisit,
    Reverse,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CascadeStep::Claim => "claim",
            CascadeStep::Points => "points",
            CascadeStep::Level => "level",
            CascadeStep::AnimalVisit => "animal-visit",
            CascadeStep::FirstVisit => "first-visit",
            CascadeStep::Reverse => "reverse",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("Persistence failed for check-in {check_in_id} at step '{step}': {source}")]
    Persistence {
        check_in_id: String,
        step: CascadeStep,
        #[source]
        source: anyhow::Error,
    },
    #[error("Notification failed: {0}")]
    Notification(#[from] NotificationError),
}

/// Aggregates after a check-in was applied
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementOutcome {
    pub points: i64,
    pub level: i64,
    pub first_visit: bool,
    pub new_achievements: Vec<Achievement>,
}

/// Aggregates after a check-in was reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReversalOutcome {
    pub points: i64,
    pub level: i64,
}

#[derive(Clone)]
pub struct EngagementService<C: Connection> {
    user_repository: C::UserRepository,
    animal_repository: C::AnimalRepository,
    check_in_repository: C::CheckInRepository,
    notifier: Arc<dyn Notifier>,
}

impl<C: Connection> EngagementService<C> {
    pub fn new(connection: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            animal_repository: connection.create_animal_repository(),
            check_in_repository: connection.create_check_in_repository(),
            notifier,
        }
    }

    /// Apply a freshly stored check-in to its author and animal
    pub async fn on_check_in_created(
        &self,
        check_in: &CheckIn,
        user: &User,
        animal: &Animal,
    ) -> Result<EngagementOutcome, EngagementError> {
        debug!(
            "Applying check-in {} for user {} on animal {}",
            check_in.id, user.id, animal.id
        );

        let claimed = self
            .check_in_repository
            .mark_applied(&check_in.id, Utc::now())
            .await
            .map_err(|e| persistence(check_in, CascadeStep::Claim, e))?;

        let points = if claimed {
            let credited = self
                .user_repository
                .adjust_points(&check_in.user_id, check_in.points_earned)
                .await;
            match credited {
                Ok(Some(points)) => points,
                Ok(None) => {
                    self.release_claim(check_in).await;
                    return Err(persistence(
                        check_in,
                        CascadeStep::Points,
                        anyhow!("User not found: {}", check_in.user_id),
                    ));
                }
                Err(e) => {
                    self.release_claim(check_in).await;
                    return Err(persistence(check_in, CascadeStep::Points, e));
                }
            }
        } else {
            info!("Check-in {} was already applied, not crediting points again", check_in.id);
            self.current_points(check_in, CascadeStep::Points).await?
        };
        debug!("Check-in {}: user {} now has {} points", check_in.id, check_in.user_id, points);

        let level = self.write_level(check_in, points).await?;

        // Runs on retries too; the check-in's visit marker keeps it to one write
        let visit_recorded = self
            .animal_repository
            .record_visit(&check_in.id, &check_in.animal_id, &check_in.visit())
            .await
            .map_err(|e| persistence(check_in, CascadeStep::AnimalVisit, e))?;
        if !visit_recorded {
            debug!("Check-in {}: visit already on animal {}", check_in.id, animal.id);
        }

        let first_visit = self
            .user_repository
            .record_animal_helped(&check_in.user_id, &check_in.animal_id)
            .await
            .map_err(|e| persistence(check_in, CascadeStep::FirstVisit, e))?
            .is_some();
        if first_visit {
            debug!("Check-in {} is the first visit of {} to {}", check_in.id, user.id, animal.id);
        }

        let new_achievements = match self.award_achievements(&check_in.user_id).await {
            Ok(awarded) => awarded,
            Err(e) => {
                error!("Achievement evaluation failed for check-in {}: {:#}", check_in.id, e);
                Vec::new()
            }
        };

        if claimed && check_in.health_status.is_emergency() {
            self.spawn_emergency_notification(animal.clone(), check_in.clone());
        }
        for achievement in &new_achievements {
            self.spawn_achievement_notification(user.clone(), achievement.clone());
        }

        info!(
            "Applied check-in {}: points={}, level={}, first_visit={}, new_achievements={}",
            check_in.id,
            points,
            level,
            first_visit,
            new_achievements.len()
        );

        Ok(EngagementOutcome {
            points,
            level,
            first_visit,
            new_achievements,
        })
    }

    /// Take back the points of a check-in that is about to be deleted.
    /// Helped-animal and visit counters are left untouched.
    pub async fn on_check_in_deleted(
        &self,
        check_in: &CheckIn,
        user: &User,
    ) -> Result<ReversalOutcome, EngagementError> {
        debug!("Reversing check-in {} for user {}", check_in.id, user.id);

        let claimed = self
            .check_in_repository
            .mark_reversed(&check_in.id, Utc::now())
            .await
            .map_err(|e| persistence(check_in, CascadeStep::Claim, e))?;

        let points = if claimed {
            let debited = self
                .user_repository
                .adjust_points(&check_in.user_id, -check_in.points_earned)
                .await;
            match debited {
                Ok(Some(points)) => points,
                Ok(None) => {
                    self.release_reversal(check_in).await;
                    return Err(persistence(
                        check_in,
                        CascadeStep::Reverse,
                        anyhow!("User not found: {}", check_in.user_id),
                    ));
                }
                Err(e) => {
                    self.release_reversal(check_in).await;
                    return Err(persistence(check_in, CascadeStep::Reverse, e));
                }
            }
        } else {
            info!("Check-in {} has no credited points to take back", check_in.id);
            self.current_points(check_in, CascadeStep::Reverse).await?
        };

        let level = self.write_level(check_in, points).await?;

        info!("Reversed check-in {}: points={}, level={}", check_in.id, points, level);
        Ok(ReversalOutcome { points, level })
    }

    /// Achievements the user would newly earn with the given counters
    pub fn evaluate_achievements(
        &self,
        user: &User,
        check_in_count: i64,
        unique_animal_count: i64,
    ) -> Result<Vec<Achievement>, AchievementError> {
        achievements::evaluate_for_user(user, check_in_count, unique_animal_count)
    }

    async fn award_achievements(&self, user_id: &str) -> anyhow::Result<Vec<Achievement>> {
        let user = self
            .user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found: {}", user_id))?;
        let check_in_count = self.check_in_repository.count_applied_for_user(user_id).await?;

        let held: HashSet<String> = user.achievements.iter().map(|a| a.title.clone()).collect();
        let candidates = achievements::evaluate(
            check_in_count,
            user.total_animals_helped,
            level_for(user.points),
            &held,
            Utc::now(),
        )?;

        let mut awarded = Vec::new();
        for achievement in candidates {
            // A concurrent cascade may have inserted the same title first
            if self.user_repository.award_achievement(user_id, &achievement).await? {
                info!("🏅 User {} earned '{}'", user_id, achievement.title);
                awarded.push(achievement);
            }
        }
        Ok(awarded)
    }

    async fn write_level(&self, check_in: &CheckIn, points: i64) -> Result<i64, EngagementError> {
        let level = level_for(points);
        let written = self
            .user_repository
            .set_level_if_points(&check_in.user_id, level, points)
            .await
            .map_err(|e| persistence(check_in, CascadeStep::Level, e))?;
        if !written {
            debug!(
                "Points for {} moved past {} concurrently; level left to the newer update",
                check_in.user_id, points
            );
        }
        Ok(level)
    }

    async fn current_points(
        &self,
        check_in: &CheckIn,
        step: CascadeStep,
    ) -> Result<i64, EngagementError> {
        match self.user_repository.get_user(&check_in.user_id).await {
            Ok(Some(user)) => Ok(user.points),
            Ok(None) => {
                let missing = anyhow!("User not found: {}", check_in.user_id);
                Err(persistence(check_in, step, missing))
            }
            Err(e) => Err(persistence(check_in, step, e)),
        }
    }

    async fn release_claim(&self, check_in: &CheckIn) {
        if let Err(e) = self.check_in_repository.clear_applied(&check_in.id).await {
            error!("Failed to release applied marker of check-in {}: {:#}", check_in.id, e);
        }
    }

    async fn release_reversal(&self, check_in: &CheckIn) {
        if let Err(e) = self.check_in_repository.clear_reversed(&check_in.id).await {
            error!("Failed to release reversed marker of check-in {}: {:#}", check_in.id, e);
        }
    }

    fn spawn_emergency_notification(&self, animal: Animal, check_in: CheckIn) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_emergency(&animal, &check_in).await {
                warn!("{} (emergency for check-in {})", EngagementError::from(e), check_in.id);
            }
        });
    }

    fn spawn_achievement_notification(&self, user: User, achievement: Achievement) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_achievement(&user, &achievement).await {
                warn!(
                    "{} (achievement '{}' for user {})",
                    EngagementError::from(e),
                    achievement.title,
                    user.id
                );
            }
        });
    }
}

fn persistence(check_in: &CheckIn, step: CascadeStep, source: anyhow::Error) -> EngagementError {
    error!("Check-in {} failed at step '{}': {:#}", check_in.id, step, source);
    EngagementError::Persistence {
        check_in_id: check_in.id.clone(),
        step,
        source,
    }
}
