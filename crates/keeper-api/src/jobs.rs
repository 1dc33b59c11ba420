use crate::AppState;
use crate::error::{ErrorBody, Result};
use axum::{Json, extract::State};
use entity::jobs;

#[utoipa::path(
    get,
    path = "/jobs",
    responses(
        (status = OK, description = "All configured jobs", body = Vec<jobs::Model>),
        (status = INTERNAL_SERVER_ERROR, body = ErrorBody),
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<jobs::Model>>> {
    Ok(Json(state.store.jobs().list_all().await?))
}
