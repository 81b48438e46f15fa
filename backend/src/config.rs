//! Runtime configuration
//!
//! Every option can be given on the command line or through the environment.
//! A `.env` file in the working directory is loaded before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Stray animal check-in backend
#[derive(Parser, Debug, Clone)]
#[command(name = "strayhelp-backend")]
#[command(about = "Check-in, reputation and achievement service for stray animal volunteers")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:strayhelp.db")]
    pub database_url: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:8080")]
    pub cors_origin: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
    pub db_max_connections: u32,

    /// How long a writer waits on a locked database before failing, in milliseconds
    #[arg(long, env = "DB_BUSY_TIMEOUT_MS", default_value = "5000")]
    pub db_busy_timeout_ms: u64,
}

impl Config {
    /// Load `.env` (if present) and parse arguments/environment
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn db_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }

    /// Reject settings that would make the server unusable
    pub fn validate(&self) -> Result<(), String> {
        if self.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be positive".to_string());
        }
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL cannot be empty".to_string());
        }
        Ok(())
    }
}
