use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_json, decode_optional_time, decode_time, encode_json, encode_time};
use crate::domain::models::{Animal, AnimalVisit};
use crate::storage::connection::DbConnection;
use crate::storage::traits::AnimalStorage;

#[derive(Clone)]
pub struct AnimalRepository {
    db: DbConnection,
}

impl AnimalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn animal_from_row(row: &SqliteRow) -> Result<Animal> {
        let health: String = row.try_get("health")?;
        let needs: String = row.try_get("needs")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Animal {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            discovered_by: row.try_get("discovered_by")?,
            health: health.parse()?,
            needs: decode_json(&needs)?,
            needs_description: row.try_get("needs_description")?,
            visit_count: row.try_get("visit_count")?,
            last_visit_at: decode_optional_time(row.try_get("last_visit_at")?)?,
            created_at: decode_time(&created_at)?,
        })
    }
}

#[async_trait]
impl AnimalStorage for AnimalRepository {
    async fn store_animal(&self, animal: &Animal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO animals (id, name, description, discovered_by, health, needs,
                                 needs_description, visit_count, last_visit_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&animal.id)
        .bind(&animal.name)
        .bind(&animal.description)
        .bind(&animal.discovered_by)
        .bind(animal.health.as_str())
        .bind(encode_json(&animal.needs)?)
        .bind(&animal.needs_description)
        .bind(animal.visit_count)
        .bind(animal.last_visit_at.as_ref().map(encode_time))
        .bind(encode_time(&animal.created_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_animal(&self, animal_id: &str) -> Result<Option<Animal>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, discovered_by, health, needs,
                   needs_description, visit_count, last_visit_at, created_at
            FROM animals
            WHERE id = ?
            "#,
        )
        .bind(animal_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::animal_from_row).transpose()
    }

    async fn record_visit(
        &self,
        check_in_id: &str,
        animal_id: &str,
        visit: &AnimalVisit,
    ) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE check_ins
            SET visit_recorded_at = ?
            WHERE id = ? AND visit_recorded_at IS NULL
              AND applied_at IS NOT NULL AND reversed_at IS NULL
            "#,
        )
        .bind(encode_time(&Utc::now()))
        .bind(check_in_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            tx.commit().await?;
            return Ok(false);
        }

        let updated = sqlx::query(
            r#"
            UPDATE animals
            SET last_visit_at = ?,
                health = ?,
                needs = ?,
                needs_description = ?,
                visit_count = visit_count + 1
            WHERE id = ?
            "#,
        )
        .bind(encode_time(&visit.visited_at))
        .bind(visit.health.as_str())
        .bind(encode_json(&visit.needs)?)
        .bind(&visit.needs_description)
        .bind(animal_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(anyhow!("Animal not found: {}", animal_id));
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn count_discovered_by(&self, user_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM animals WHERE discovered_by = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get("total")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;
    use crate::storage::traits::{CheckInStorage, Connection};
    use shared::{HealthStatus, Need};

    #[tokio::test]
    async fn test_store_and_get_animal() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let repo = env.connection.create_animal_repository();
        let user = env.create_test_user("Ana").await?;

        let animal = env.create_test_animal("Mingau", &user.id).await?;
        let loaded = repo.get_animal(&animal.id).await?.expect("animal should exist");

        assert_eq!(loaded, animal);
        assert!(repo.get_animal("animal::missing").await?.is_none());
        Ok(())
    }

    async fn applied_check_in(
        env: &TestEnvironment,
        user_id: &str,
        animal_id: &str,
    ) -> Result<String> {
        let check_ins = env.connection.create_check_in_repository();
        let check_in = env.sample_check_in(user_id, animal_id, Utc::now());
        check_ins.store_check_in(&check_in).await?;
        check_ins.mark_applied(&check_in.id, Utc::now()).await?;
        Ok(check_in.id)
    }

    fn visit(health: HealthStatus) -> AnimalVisit {
        AnimalVisit {
            visited_at: Utc::now(),
            health,
            needs: vec![Need::Food, Need::Shelter],
            needs_description: Some("limping on the left paw".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_visit_overwrites_and_counts() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let repo = env.connection.create_animal_repository();
        let user = env.create_test_user("Ana").await?;
        let animal = env.create_test_animal("Mingau", &user.id).await?;

        let first = applied_check_in(&env, &user.id, &animal.id).await?;
        let second = applied_check_in(&env, &user.id, &animal.id).await?;
        let latest = visit(HealthStatus::NeedsAttention);
        assert!(repo.record_visit(&first, &animal.id, &visit(HealthStatus::Good)).await?);
        assert!(repo.record_visit(&second, &animal.id, &latest).await?);

        let loaded = repo.get_animal(&animal.id).await?.unwrap();
        assert_eq!(loaded.visit_count, 2);
        assert_eq!(loaded.health, HealthStatus::NeedsAttention);
        assert_eq!(loaded.needs, vec![Need::Food, Need::Shelter]);
        assert_eq!(loaded.needs_description.as_deref(), Some("limping on the left paw"));
        assert_eq!(loaded.last_visit_at, Some(latest.visited_at));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_visit_lands_once_per_check_in() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let repo = env.connection.create_animal_repository();
        let user = env.create_test_user("Ana").await?;
        let animal = env.create_test_animal("Mingau", &user.id).await?;
        let check_in_id = applied_check_in(&env, &user.id, &animal.id).await?;

        assert!(repo.record_visit(&check_in_id, &animal.id, &visit(HealthStatus::Good)).await?);
        assert!(!repo.record_visit(&check_in_id, &animal.id, &visit(HealthStatus::Good)).await?);

        // Pending check-ins do not touch the animal
        let pending = env.sample_check_in(&user.id, &animal.id, Utc::now());
        env.connection.create_check_in_repository().store_check_in(&pending).await?;
        assert!(!repo.record_visit(&pending.id, &animal.id, &visit(HealthStatus::Good)).await?);

        assert_eq!(repo.get_animal(&animal.id).await?.unwrap().visit_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_visit_on_missing_animal_keeps_marker_open() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let repo = env.connection.create_animal_repository();
        let user = env.create_test_user("Ana").await?;
        let animal = env.create_test_animal("Mingau", &user.id).await?;
        let check_in_id = applied_check_in(&env, &user.id, &animal.id).await?;

        assert!(repo
            .record_visit(&check_in_id, "animal::missing", &visit(HealthStatus::Good))
            .await
            .is_err());
        // Rolled back, so the real animal can still receive the visit
        assert!(repo.record_visit(&check_in_id, &animal.id, &visit(HealthStatus::Good)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_count_discovered_by() -> Result<()> {
        let env = TestEnvironment::new().await?;
        let repo = env.connection.create_animal_repository();
        let ana = env.create_test_user("Ana").await?;
        let bia = env.create_test_user("Bia").await?;
        env.create_test_animal("Mingau", &ana.id).await?;
        env.create_test_animal("Frajola", &ana.id).await?;
        env.create_test_animal("Pretinha", &bia.id).await?;

        assert_eq!(repo.count_discovered_by(&ana.id).await?, 2);
        assert_eq!(repo.count_discovered_by(&bia.id).await?, 1);
        Ok(())
    }
}
