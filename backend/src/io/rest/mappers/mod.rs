pub mod animal_mapper;
pub mod check_in_mapper;
pub mod user_mapper;

use chrono::{DateTime, SecondsFormat, Utc};

/// Wire format for timestamps in responses
pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
