use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_json, decode_optional_time, decode_time, encode_json, encode_time};
use crate::domain::models::CheckIn;
use crate::storage::connection::DbConnection;
use crate::storage::traits::CheckInStorage;

const CHECK_IN_COLUMNS: &str = "id, user_id, animal_id, actions, actions_description, health_status, \
     needs, needs_description, points_earned, created_at, applied_at, reversed_at";

/// Repository for check-ins and their applied/reversed markers
#[derive(Clone)]
pub struct CheckInRepository {
    db: DbConnection,
}

impl CheckInRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn check_in_from_row(row: &SqliteRow) -> Result<CheckIn> {
        let actions: String = row.try_get("actions")?;
        let health_status: String = row.try_get("health_status")?;
        let needs: String = row.try_get("needs")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(CheckIn {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            animal_id: row.try_get("animal_id")?,
            actions: decode_json(&actions)?,
            actions_description: row.try_get("actions_description")?,
            health_status: health_status.parse()?,
            needs: decode_json(&needs)?,
            needs_description: row.try_get("needs_description")?,
            points_earned: row.try_get("points_earned")?,
            created_at: decode_time(&created_at)?,
            applied_at: decode_optional_time(row.try_get("applied_at")?)?,
            reversed_at: decode_optional_time(row.try_get("reversed_at")?)?,
        })
    }

    async fn count_where(&self, sql: &str, key: &str) -> Result<i64> {
        let row = sqlx::query(sql).bind(key).fetch_one(self.db.pool()).await?;
        Ok(row.try_get("total")?)
    }
}

#[async_trait]
impl CheckInStorage for CheckInRepository {
    async fn store_check_in(&self, check_in: &CheckIn) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO check_ins (id, user_id, animal_id, actions, actions_description,
                                   health_status, needs, needs_description, points_earned,
                                   created_at, applied_at, reversed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&check_in.id)
        .bind(&check_in.user_id)
        .bind(&check_in.animal_id)
        .bind(encode_json(&check_in.actions)?)
        .bind(&check_in.actions_description)
        .bind(check_in.health_status.as_str())
        .bind(encode_json(&check_in.needs)?)
        .bind(&check_in.needs_description)
        .bind(check_in.points_earned)
        .bind(encode_time(&check_in.created_at))
        .bind(check_in.applied_at.as_ref().map(encode_time))
        .bind(check_in.reversed_at.as_ref().map(encode_time))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_check_in(&self, check_in_id: &str) -> Result<Option<CheckIn>> {
        let sql = format!("SELECT {} FROM check_ins WHERE id = ?", CHECK_IN_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(check_in_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::check_in_from_row).transpose()
    }

    async fn delete_check_in(&self, check_in_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM check_ins WHERE id = ?")
            .bind(check_in_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_applied(&self, check_in_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE check_ins
            SET applied_at = ?
            WHERE id = ? AND applied_at IS NULL AND reversed_at IS NULL
            "#,
        )
        .bind(encode_time(&at))
        .bind(check_in_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_applied(&self, check_in_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE check_ins
            SET applied_at = NULL
            WHERE id = ? AND applied_at IS NOT NULL AND reversed_at IS NULL
            "#,
        )
        .bind(check_in_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_reversed(&self, check_in_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE check_ins
            SET reversed_at = ?
            WHERE id = ? AND applied_at IS NOT NULL AND reversed_at IS NULL
            "#,
        )
        .bind(encode_time(&at))
        .bind(check_in_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_reversed(&self, check_in_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE check_ins
            SET reversed_at = NULL
            WHERE id = ? AND reversed_at IS NOT NULL
            "#,
        )
        .bind(check_in_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        self.count_where("SELECT COUNT(*) AS total FROM check_ins WHERE user_id = ?", user_id)
            .await
    }

    async fn count_applied_for_user(&self, user_id: &str) -> Result<i64> {
        self.count_where(
            "SELECT COUNT(*) AS total FROM check_ins \
             WHERE user_id = ? AND applied_at IS NOT NULL AND reversed_at IS NULL",
            user_id,
        )
        .await
    }

    async fn count_for_animal(&self, animal_id: &str) -> Result<i64> {
        self.count_where("SELECT COUNT(*) AS total FROM check_ins WHERE animal_id = ?", animal_id)
            .await
    }

    async fn count_distinct_animals_for_user(&self, user_id: &str) -> Result<i64> {
        self.count_where(
            "SELECT COUNT(DISTINCT animal_id) AS total FROM check_ins WHERE user_id = ?",
            user_id,
        )
        .await
    }

    async fn list_for_user(&self, user_id: &str, limit: u32, offset: u32) -> Result<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {} FROM check_ins WHERE user_id = ? ORDER BY created_at DESC, ROWID DESC LIMIT ? OFFSET ?",
            CHECK_IN_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::check_in_from_row).collect()
    }

    async fn list_for_animal(
        &self,
        animal_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {} FROM check_ins WHERE animal_id = ? ORDER BY created_at DESC, ROWID DESC LIMIT ? OFFSET ?",
            CHECK_IN_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(animal_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::check_in_from_row).collect()
    }

    async fn list_all_for_user(&self, user_id: &str) -> Result<Vec<CheckIn>> {
        let sql = format!(
            "SELECT {} FROM check_ins WHERE user_id = ? ORDER BY created_at DESC, ROWID DESC",
            CHECK_IN_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::check_in_from_row).collect()
    }
}
