use chrono::Weekday;
use shared::{
    ActionStat, RankingEntry, RankingResponse, UserProfileResponse, UserStats, WeekdayStat,
};

use super::format_time;
use crate::domain::commands::profile::{RankingResult, UserProfile, UserStatistics};
use crate::domain::models::{Achievement, User, UserSummary};

pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: User) -> shared::User {
        shared::User {
            id: domain.id,
            name: domain.name,
            points: domain.points,
            level: domain.level,
            total_animals_helped: domain.total_animals_helped,
            achievements: Self::achievements_to_dto(domain.achievements),
            created_at: format_time(&domain.created_at),
        }
    }

    pub fn achievement_to_dto(domain: Achievement) -> shared::Achievement {
        shared::Achievement {
            title: domain.title,
            description: domain.description,
            icon: domain.icon,
            date_earned: format_time(&domain.date_earned),
        }
    }

    pub fn achievements_to_dto(domain: Vec<Achievement>) -> Vec<shared::Achievement> {
        domain.into_iter().map(Self::achievement_to_dto).collect()
    }

    pub fn to_ranking_entry(domain: UserSummary) -> RankingEntry {
        RankingEntry {
            id: domain.id,
            name: domain.name,
            points: domain.points,
            level: domain.level,
            total_animals_helped: domain.total_animals_helped,
        }
    }

    pub fn to_ranking_response(result: RankingResult) -> RankingResponse {
        RankingResponse {
            ranking: result.ranking.into_iter().map(Self::to_ranking_entry).collect(),
            user_rank: result.user_rank,
        }
    }

    pub fn stats_to_dto(stats: UserStatistics) -> UserStats {
        UserStats {
            total_check_ins: stats.total_check_ins,
            total_unique_animals: stats.total_unique_animals,
            total_discovered: stats.total_discovered,
            action_stats: stats
                .action_stats
                .into_iter()
                .map(|(action, count)| ActionStat { action, count })
                .collect(),
            check_ins_by_weekday: stats
                .check_ins_by_weekday
                .into_iter()
                .map(|(day, count)| WeekdayStat { day: weekday_name(day).to_string(), count })
                .collect(),
            current_streak: stats.streaks.current_streak,
            longest_streak: stats.streaks.longest_streak,
        }
    }

    pub fn to_profile_response(profile: UserProfile) -> UserProfileResponse {
        UserProfileResponse {
            user: Self::to_dto(profile.user),
            stats: Self::stats_to_dto(profile.stats),
            progress: profile.progress,
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
