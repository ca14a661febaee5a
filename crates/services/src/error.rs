//! Shared error types for the services crate.

use thiserror::Error;

use kioku_core::scheduler::SchedulerError;
use kioku_storage::repository::StorageError;
use kioku_storage::sqlite::SqliteInitError;

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyServiceError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GamificationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GamificationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
