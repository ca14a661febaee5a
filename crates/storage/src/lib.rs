//! Persistence for the kioku workspace: repository traits, an in-memory
//! backend for tests, and the `SQLite` backend used by the app.

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, ItemRepository, ProgressRepository, ReviewLogRecord, ReviewLogRepository,
    Storage, StorageError, UserStatsRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
