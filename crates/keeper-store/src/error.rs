use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("build not found: {job}#{number}")]
    BuildNotFound { job: String, number: i32 },

    #[error("invalid next build number {value} for job {job}: must be at least {min_allowed}")]
    InvalidCounterValue {
        job: String,
        value: i32,
        min_allowed: i32,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
