use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_time, encode_time};
use crate::domain::models::{Achievement, User, UserSummary};
use crate::storage::connection::DbConnection;
use crate::storage::traits::UserStorage;

/// Repository for user aggregates and their achievements
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn user_from_row(row: &SqliteRow) -> Result<User> {
        let created_at: String = row.try_get("created_at")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            points: row.try_get("points")?,
            level: row.try_get("level")?,
            total_animals_helped: row.try_get("total_animals_helped")?,
            achievements: Vec::new(),
            created_at: decode_time(&created_at)?,
        })
    }

    fn achievement_from_row(row: &SqliteRow) -> Result<Achievement> {
        let date_earned: String = row.try_get("date_earned")?;
        Ok(Achievement {
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            icon: row.try_get("icon")?,
            date_earned: decode_time(&date_earned)?,
        })
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, points, level, total_animals_helped, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.points)
        .bind(user.level)
        .bind(user.total_animals_helped)
        .bind(encode_time(&user.created_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, points, level, total_animals_helped, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => {
                let mut user = Self::user_from_row(&r)?;
                user.achievements = self.list_achievements(user_id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn adjust_points(&self, user_id: &str, delta: i64) -> Result<Option<i64>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET points = MAX(points + ?, 0)
            WHERE id = ?
            RETURNING points
            "#,
        )
        .bind(delta)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("points")?)),
            None => Ok(None),
        }
    }

    async fn set_level_if_points(&self, user_id: &str, level: i64, points: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET level = ?
            WHERE id = ? AND points = ?
            "#,
        )
        .bind(level)
        .bind(user_id)
        .bind(points)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_animal_helped(&self, user_id: &str, animal_id: &str) -> Result<Option<i64>> {
        let mut tx = self.db.pool().begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_animal_visits (user_id, animal_id, first_visit_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(animal_id)
        .bind(encode_time(&Utc::now()))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.commit().await?;
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            UPDATE users
            SET total_animals_helped = total_animals_helped + 1
            WHERE id = ?
            RETURNING total_animals_helped
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(r) => {
                let total: i64 = r.try_get("total_animals_helped")?;
                tx.commit().await?;
                Ok(Some(total))
            }
            None => {
                tx.rollback().await?;
                Err(anyhow!("User not found: {}", user_id))
            }
        }
    }

    async fn award_achievement(&self, user_id: &str, achievement: &Achievement) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_achievements (user_id, title, description, icon, date_earned)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.icon)
        .bind(encode_time(&achievement.date_earned))
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        let rows = sqlx::query(
            r#"
            SELECT title, description, icon, date_earned
            FROM user_achievements
            WHERE user_id = ?
            ORDER BY date_earned ASC, ROWID ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::achievement_from_row).collect()
    }

    async fn list_top_users(&self, limit: u32) -> Result<Vec<UserSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, points, level, total_animals_helped
            FROM users
            ORDER BY points DESC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(UserSummary {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    points: row.try_get("points")?,
                    level: row.try_get("level")?,
                    total_animals_helped: row.try_get("total_animals_helped")?,
                })
            })
            .collect()
    }

    async fn count_users_with_more_points(&self, points: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users WHERE points > ?")
            .bind(points)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get("total")?)
    }
}
