//! Achievement catalog and unlock evaluation.
//!
//! Achievements are keyed by title. A milestone is earned once its counter is
//! at or above the threshold and the title is not already held, so repeated
//! or late evaluation never skips or duplicates a badge.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::domain::models::{Achievement, User};

/// Counter a milestone is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    CheckIns(i64),
    UniqueAnimals(i64),
    Level(i64),
}

/// Static description of an unlockable badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub milestone: Milestone,
}

impl AchievementDefinition {
    pub fn to_achievement(&self, date_earned: DateTime<Utc>) -> Achievement {
        Achievement {
            title: self.title.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            date_earned,
        }
    }

    fn is_reached(&self, check_in_count: i64, unique_animal_count: i64, level: i64) -> bool {
        match self.milestone {
            Milestone::CheckIns(threshold) => check_in_count >= threshold,
            Milestone::UniqueAnimals(threshold) => unique_animal_count >= threshold,
            Milestone::Level(threshold) => level >= threshold,
        }
    }
}

pub const CATALOG: [AchievementDefinition; 10] = [
    AchievementDefinition {
        title: "First Contact",
        description: "Logged your first check-in with an animal",
        icon: "achievements/first-checkin.png",
        milestone: Milestone::CheckIns(1),
    },
    AchievementDefinition {
        title: "Animal Friend",
        description: "Logged 10 check-ins",
        icon: "achievements/10-checkins.png",
        milestone: Milestone::CheckIns(10),
    },
    AchievementDefinition {
        title: "Animal Protector",
        description: "Logged 50 check-ins",
        icon: "achievements/50-checkins.png",
        milestone: Milestone::CheckIns(50),
    },
    AchievementDefinition {
        title: "Animal Guardian",
        description: "Logged 100 check-ins",
        icon: "achievements/100-checkins.png",
        milestone: Milestone::CheckIns(100),
    },
    AchievementDefinition {
        title: "Street Legend",
        description: "Logged 500 check-ins",
        icon: "achievements/500-checkins.png",
        milestone: Milestone::CheckIns(500),
    },
    AchievementDefinition {
        title: "Many Friends",
        description: "Helped 5 different animals",
        icon: "achievements/5-animals.png",
        milestone: Milestone::UniqueAnimals(5),
    },
    AchievementDefinition {
        title: "Neighbourhood Ambassador",
        description: "Helped 20 different animals",
        icon: "achievements/20-animals.png",
        milestone: Milestone::UniqueAnimals(20),
    },
    AchievementDefinition {
        title: "Safety Net",
        description: "Helped 50 different animals",
        icon: "achievements/50-animals.png",
        milestone: Milestone::UniqueAnimals(50),
    },
    AchievementDefinition {
        title: "City Protector",
        description: "Helped 100 different animals",
        icon: "achievements/100-animals.png",
        milestone: Milestone::UniqueAnimals(100),
    },
    AchievementDefinition {
        title: "Master Caretaker",
        description: "Reached level 10",
        icon: "achievements/level-10.png",
        milestone: Milestone::Level(10),
    },
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AchievementError {
    #[error("Counter '{name}' cannot be negative (got {value})")]
    NegativeCounter { name: &'static str, value: i64 },
}

pub fn find_definition(title: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|d| d.title == title)
}

/// Achievements reached by the given counters and not yet in `already_held`,
/// in catalog order, stamped with `now`
pub fn evaluate(
    check_in_count: i64,
    unique_animal_count: i64,
    level: i64,
    already_held: &HashSet<String>,
    now: DateTime<Utc>,
) -> Result<Vec<Achievement>, AchievementError> {
    for (name, value) in [
        ("check_in_count", check_in_count),
        ("unique_animal_count", unique_animal_count),
        ("level", level),
    ] {
        if value < 0 {
            return Err(AchievementError::NegativeCounter { name, value });
        }
    }

    Ok(CATALOG
        .iter()
        .filter(|d| d.is_reached(check_in_count, unique_animal_count, level))
        .filter(|d| !already_held.contains(d.title))
        .map(|d| d.to_achievement(now))
        .collect())
}

/// Evaluate against a user's current level and held titles
pub fn evaluate_for_user(
    user: &User,
    check_in_count: i64,
    unique_animal_count: i64,
) -> Result<Vec<Achievement>, AchievementError> {
    let held: HashSet<String> = user.achievements.iter().map(|a| a.title.clone()).collect();
    evaluate(check_in_count, unique_animal_count, user.level, &held, Utc::now())
}
