//! # Domain Module
//!
//! Reputation rules and the services that apply them.
//!
//! - [`scoring`], [`level`], [`streak`] and [`achievements`] are pure
//!   calculators with no I/O.
//! - [`engagement_service`] keeps user and animal aggregates consistent with
//!   check-ins; [`check_in_service`] is the command handler that invokes it.
//! - [`user_service`], [`animal_service`] and [`profile_service`] register
//!   subjects and serve read-only views.

pub mod achievements;
pub mod animal_service;
pub mod check_in_service;
pub mod commands;
pub mod engagement_service;
pub mod level;
pub mod models;
pub mod notification;
pub mod profile_service;
pub mod scoring;
pub mod streak;
pub mod user_service;

pub use animal_service::AnimalService;
pub use check_in_service::CheckInService;
pub use engagement_service::EngagementService;
pub use notification::{LoggingNotifier, Notifier};
pub use profile_service::ProfileService;
pub use user_service::UserService;
