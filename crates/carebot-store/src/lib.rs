//! CareBot Store: SQLite persistence for users, messages and analyses.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
