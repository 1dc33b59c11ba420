use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("build {job}#{number} is already finished")]
    NotCancellable { job: String, number: i32 },

    #[error("build worker pool unavailable")]
    SchedulerUnavailable,

    #[error(transparent)]
    Store(#[from] keeper_store::StoreError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
