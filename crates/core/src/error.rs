use thiserror::Error;

use crate::model::{ItemError, ProgressError, ReviewError};
use crate::scheduler::SchedulerError;

/// Umbrella error for the core crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
