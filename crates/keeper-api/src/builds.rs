use crate::AppState;
use crate::error::{ErrorBody, Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use entity::builds;
use keeper_store::StoreError;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct KeepRequest {
    pub keep: bool,
}

async fn find_build(state: &AppState, job: &str, number: i32) -> Result<builds::Model> {
    let build = state
        .store
        .builds()
        .find_by_job_and_number(job, number)
        .await?
        .ok_or_else(|| StoreError::BuildNotFound {
            job: job.to_string(),
            number,
        })?;
    Ok(build)
}

#[utoipa::path(
    get,
    path = "/jobs/{job}/builds",
    params(("job" = String, Path,)),
    responses(
        (status = OK, description = "Builds of the job, oldest first", body = Vec<builds::Model>),
        (status = NOT_FOUND, description = "Job not found", body = ErrorBody),
    )
)]
pub async fn list_builds(
    State(state): State<AppState>,
    Path(job): Path<String>,
) -> Result<Json<Vec<builds::Model>>> {
    state
        .store
        .jobs()
        .find_by_name(&job)
        .await?
        .ok_or_else(|| StoreError::JobNotFound(job.clone()))?;

    Ok(Json(state.store.builds().list_by_job(&job).await?))
}

#[utoipa::path(
    post,
    path = "/jobs/{job}/builds",
    params(("job" = String, Path,)),
    responses(
        (status = CREATED, description = "Build queued", body = builds::Model),
        (status = NOT_FOUND, description = "Job not found", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Worker pool not running", body = ErrorBody),
    )
)]
pub async fn schedule_build(
    State(state): State<AppState>,
    Path(job): Path<String>,
) -> Result<(StatusCode, Json<builds::Model>)> {
    let build = state.scheduler.schedule_build(&job).await?;
    Ok((StatusCode::CREATED, Json(build)))
}

#[utoipa::path(
    put,
    path = "/jobs/{job}/builds/{number}/keep",
    params(("job" = String, Path,), ("number" = i32, Path,)),
    request_body = KeepRequest,
    responses(
        (status = OK, description = "Keep-forever flag updated", body = builds::Model),
        (status = NOT_FOUND, description = "Build not found", body = ErrorBody),
    )
)]
pub async fn set_keep(
    State(state): State<AppState>,
    Path((job, number)): Path<(String, i32)>,
    Json(request): Json<KeepRequest>,
) -> Result<Json<builds::Model>> {
    let build = state
        .store
        .builds()
        .mark_kept_forever(&job, number, request.keep)
        .await?;

    info!("Build {}#{} kept_forever={}", job, number, request.keep);
    Ok(Json(build))
}

#[utoipa::path(
    post,
    path = "/jobs/{job}/builds/{number}/cancel",
    params(("job" = String, Path,), ("number" = i32, Path,)),
    responses(
        (status = OK, description = "Cancellation requested"),
        (status = NOT_FOUND, description = "Build not found", body = ErrorBody),
        (status = BAD_REQUEST, description = "Build cannot be cancelled", body = ErrorBody),
    )
)]
pub async fn cancel_build(
    State(state): State<AppState>,
    Path((job, number)): Path<(String, i32)>,
) -> Result<StatusCode> {
    let build = find_build(&state, &job, number).await?;
    state.scheduler.cancel_build(&build).await?;
    Ok(StatusCode::OK)
}
