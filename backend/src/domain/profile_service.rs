//! Read-only reputation views: statistics, profile and ranking.

use chrono::{Datelike, Weekday};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::profile::{RankingQuery, RankingResult, UserProfile, UserStatistics};
use crate::domain::level::experience_progress;
use crate::domain::models::CheckIn;
use crate::domain::streak::calculate_streaks;
use crate::storage::{AnimalStorage, CheckInStorage, Connection, UserStorage};

pub const DEFAULT_RANKING_SIZE: u32 = 10;
pub const MAX_RANKING_SIZE: u32 = 100;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error("User {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct ProfileService<C: Connection> {
    user_repository: C::UserRepository,
    animal_repository: C::AnimalRepository,
    check_in_repository: C::CheckInRepository,
}

impl<C: Connection> ProfileService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            animal_repository: connection.create_animal_repository(),
            check_in_repository: connection.create_check_in_repository(),
        }
    }

    pub async fn get_user_stats(
        &self,
        user_id: &str,
    ) -> Result<UserStatistics, ProfileServiceError> {
        if self.user_repository.get_user(user_id).await?.is_none() {
            return Err(ProfileServiceError::NotFound(user_id.to_string()));
        }
        self.compute_stats(user_id).await
    }

    /// User, statistics and level progress in one view
    pub async fn get_user_profile(
        &self,
        user_id: &str,
    ) -> Result<UserProfile, ProfileServiceError> {
        let user = self
            .user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| ProfileServiceError::NotFound(user_id.to_string()))?;
        let stats = self.compute_stats(user_id).await?;
        let progress = experience_progress(user.points, user.level);

        Ok(UserProfile { user, stats, progress })
    }

    pub async fn get_ranking(
        &self,
        query: RankingQuery,
    ) -> Result<RankingResult, ProfileServiceError> {
        let limit = query.limit.unwrap_or(DEFAULT_RANKING_SIZE).clamp(1, MAX_RANKING_SIZE);
        let ranking = self.user_repository.list_top_users(limit).await?;

        let user_rank = match query.requester_id.as_deref() {
            Some(requester_id) => match self.user_repository.get_user(requester_id).await? {
                Some(user) => {
                    let ahead = self
                        .user_repository
                        .count_users_with_more_points(user.points)
                        .await?;
                    Some(1 + ahead)
                }
                None => None,
            },
            None => None,
        };

        info!("Ranking computed: {} entries, requester rank {:?}", ranking.len(), user_rank);
        Ok(RankingResult { ranking, user_rank })
    }

    async fn compute_stats(&self, user_id: &str) -> Result<UserStatistics, ProfileServiceError> {
        let total_check_ins = self.check_in_repository.count_for_user(user_id).await?;
        let total_unique_animals = self
            .check_in_repository
            .count_distinct_animals_for_user(user_id)
            .await?;
        let total_discovered = self.animal_repository.count_discovered_by(user_id).await?;
        let history = self.check_in_repository.list_all_for_user(user_id).await?;

        let dates: Vec<_> = history.iter().map(|c| c.created_at).collect();

        Ok(UserStatistics {
            total_check_ins,
            total_unique_animals,
            total_discovered,
            action_stats: action_stats(&history),
            check_ins_by_weekday: weekday_stats(&history),
            streaks: calculate_streaks(&dates),
        })
    }
}

/// How often each action was reported, most frequent first
fn action_stats(history: &[CheckIn]) -> Vec<(shared::Action, i64)> {
    let mut counts = BTreeMap::new();
    for action in history.iter().flat_map(|c| c.actions.iter()) {
        *counts.entry(*action).or_insert(0i64) += 1;
    }
    let mut stats: Vec<_> = counts.into_iter().collect();
    // Stable sort keeps catalog order among ties
    stats.sort_by(|a, b| b.1.cmp(&a.1));
    stats
}

/// Check-ins per UTC weekday, Monday first, zero days included
fn weekday_stats(history: &[CheckIn]) -> Vec<(Weekday, i64)> {
    WEEK.iter()
        .map(|day| {
            let count = history.iter().filter(|c| c.created_at.weekday() == *day).count() as i64;
            (*day, count)
        })
        .collect()
}
