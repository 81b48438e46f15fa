//! SQLite repositories
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
//! ordering matches time ordering. Vocabulary lists are stored as JSON arrays.

pub mod animal_repository;
pub mod check_in_repository;
pub mod user_repository;

pub use animal_repository::AnimalRepository;
pub use check_in_repository::CheckInRepository;
pub use user_repository::UserRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub(crate) fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_time(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: '{}'", value))?;
    Ok(parsed.with_timezone(&Utc))
}

pub(crate) fn decode_optional_time(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(decode_time).transpose()
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(value).with_context(|| format!("Invalid stored list: '{}'", value))
}
