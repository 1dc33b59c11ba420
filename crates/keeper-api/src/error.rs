use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keeper_purge::PurgeError;
use keeper_scheduler::SchedulerError;
use keeper_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Purge(#[from] PurgeError),
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::Store(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::JobNotFound(_) | StoreError::BuildNotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidCounterValue { .. } => StatusCode::CONFLICT,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(e) => store_status(e),
            ApiError::Scheduler(e) => match e {
                SchedulerError::NotCancellable { .. } => StatusCode::BAD_REQUEST,
                SchedulerError::SchedulerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                SchedulerError::Store(e) => store_status(e),
                SchedulerError::Database(_) | SchedulerError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Purge(e) => match e {
                PurgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                PurgeError::JobNotFound(_) => StatusCode::NOT_FOUND,
                PurgeError::CounterResetFailed { source, .. } => match source {
                    StoreError::InvalidCounterValue { .. } => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
                PurgeError::Store(e) => store_status(e),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
