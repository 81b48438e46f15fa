use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::storage::sqlite::{AnimalRepository, CheckInRepository, UserRepository};
use crate::storage::traits::Connection;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to the database at `url`, creating it if it doesn't exist
    pub async fn new(url: &str, max_connections: u32, busy_timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;
        Self::connect_with(options, max_connections, busy_timeout).await
    }

    /// Connect using the configured URL and pool settings
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.database_url, config.db_max_connections, config.db_busy_timeout()).await
    }

    /// Open (or create) a database file at `path` with default pool settings
    pub async fn open_path(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect_with(options, DEFAULT_MAX_CONNECTIONS, DEFAULT_BUSY_TIMEOUT).await
    }

    async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!("Database ready ({} max connections)", max_connections);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
                level INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
                total_animals_helped INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Leaderboard ordering
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_points
            ON users(points DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS animals (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                discovered_by TEXT NOT NULL,
                health TEXT NOT NULL,
                needs TEXT NOT NULL DEFAULT '[]',
                needs_description TEXT,
                visit_count INTEGER NOT NULL DEFAULT 0,
                last_visit_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (discovered_by) REFERENCES users (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_animals_discovered_by
            ON animals(discovered_by);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS check_ins (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                animal_id TEXT NOT NULL,
                actions TEXT NOT NULL,
                actions_description TEXT,
                health_status TEXT NOT NULL,
                needs TEXT NOT NULL DEFAULT '[]',
                needs_description TEXT,
                points_earned INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                applied_at TEXT,
                reversed_at TEXT,
                visit_recorded_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id),
                FOREIGN KEY (animal_id) REFERENCES animals (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_check_ins_user
            ON check_ins(user_id, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_check_ins_animal
            ON check_ins(animal_id, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // One row per (user, animal) pair ever helped; the primary key is what
        // keeps total_animals_helped from being incremented twice for a pair
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_animal_visits (
                user_id TEXT NOT NULL,
                animal_id TEXT NOT NULL,
                first_visit_at TEXT NOT NULL,
                PRIMARY KEY (user_id, animal_id),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_achievements (
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                icon TEXT NOT NULL,
                date_earned TEXT NOT NULL,
                PRIMARY KEY (user_id, title),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type UserRepository = UserRepository;
    type AnimalRepository = AnimalRepository;
    type CheckInRepository = CheckInRepository;

    fn create_user_repository(&self) -> Self::UserRepository {
        UserRepository::new(self.clone())
    }

    fn create_animal_repository(&self) -> Self::AnimalRepository {
        AnimalRepository::new(self.clone())
    }

    fn create_check_in_repository(&self) -> Self::CheckInRepository {
        CheckInRepository::new(self.clone())
    }
}
