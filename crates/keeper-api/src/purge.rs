use crate::AppState;
use crate::error::{ErrorBody, Result};
use axum::{
    Json,
    extract::{Path, State},
};
use keeper_purge::{PurgeRequest, PurgeResult};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PurgeOptions {
    /// Recompute the next build number from the builds left afterwards.
    #[serde(default)]
    pub reset_next_build: bool,
    /// Delete kept and running builds too.
    #[serde(default)]
    pub force: bool,
}

#[utoipa::path(
    post,
    path = "/jobs/{job}/purge",
    params(("job" = String, Path,)),
    request_body = PurgeOptions,
    responses(
        (status = OK, description = "Purge finished; skipped builds are listed", body = PurgeResult),
        (status = BAD_REQUEST, description = "Invalid job name", body = ErrorBody),
        (status = NOT_FOUND, description = "Job not found", body = ErrorBody),
        (status = CONFLICT, description = "Counter could not be reset", body = ErrorBody),
    )
)]
pub async fn purge_job(
    State(state): State<AppState>,
    Path(job): Path<String>,
    Json(options): Json<PurgeOptions>,
) -> Result<Json<PurgeResult>> {
    let request = PurgeRequest {
        job_id: job,
        reset_next_build: options.reset_next_build,
        force: options.force,
    };

    Ok(Json(state.purge.execute(&request).await?))
}
