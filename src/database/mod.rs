// src/database/mod.rs
//! Reference remote store over SQLite. All SQL writes in the crate live here.

pub mod error;
pub mod helpers;
pub mod sqlite_store;

pub use error::{DbError, DbResult};
pub use sqlite_store::SqliteRemoteStore;
