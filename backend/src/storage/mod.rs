//! # Storage Module
//!
//! Persistence for users, animals and check-ins behind the traits in
//! [`traits`]. The SQLite implementation lives in [`sqlite`] and is wired up
//! through [`connection::DbConnection`].

pub mod connection;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use connection::DbConnection;
pub use traits::{AnimalStorage, CheckInStorage, Connection, UserStorage};
