use crate::policy::Refusal;
use crate::result::SkipReason;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurgeError {
    #[error("invalid purge request: {0}")]
    InvalidRequest(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("build {job}#{number} not deleted: {reason}")]
    BuildNotDeletable {
        job: String,
        number: i32,
        reason: Refusal,
    },

    #[error("failed to delete build {job}#{number}: {source}")]
    BuildDeletionFailed {
        job: String,
        number: i32,
        #[source]
        source: keeper_store::StoreError,
    },

    #[error("build {job}#{number} still running after {timeout:?}")]
    CancellationTimeout {
        job: String,
        number: i32,
        timeout: Duration,
    },

    #[error("could not determine whether build {job}#{number} is running: {source}")]
    StatusCheckFailed {
        job: String,
        number: i32,
        #[source]
        source: keeper_scheduler::SchedulerError,
    },

    #[error("could not stop build {job}#{number}: {source}")]
    CancellationFailed {
        job: String,
        number: i32,
        #[source]
        source: keeper_scheduler::SchedulerError,
    },

    #[error("failed to reset next build number of {job} after deleting {deleted} build(s): {source}")]
    CounterResetFailed {
        job: String,
        deleted: usize,
        #[source]
        source: keeper_store::StoreError,
    },

    #[error(transparent)]
    Store(#[from] keeper_store::StoreError),
}

impl PurgeError {
    /// How a per-build error shows up in the purge result. `None` for
    /// errors that end the whole purge.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            PurgeError::BuildNotDeletable { .. } => Some(SkipReason::NotDeletable),
            PurgeError::BuildDeletionFailed { .. } => Some(SkipReason::DeletionFailed),
            PurgeError::CancellationTimeout { .. } => Some(SkipReason::CancellationTimeout),
            PurgeError::StatusCheckFailed { .. } => Some(SkipReason::StatusCheckFailed),
            PurgeError::CancellationFailed { .. } => Some(SkipReason::CancellationFailed),
            PurgeError::InvalidRequest(_)
            | PurgeError::JobNotFound(_)
            | PurgeError::CounterResetFailed { .. }
            | PurgeError::Store(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PurgeError>;
