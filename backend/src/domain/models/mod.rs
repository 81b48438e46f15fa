pub mod achievement;
pub mod animal;
pub mod check_in;
pub mod user;

pub use achievement::Achievement;
pub use animal::{Animal, AnimalVisit};
pub use check_in::{CheckIn, CheckInState, CheckInValidationError};
pub use user::{User, UserSummary};
