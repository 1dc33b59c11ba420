mod builds;
mod error;
mod jobs;
mod purge;

pub use error::{ApiError, ErrorBody, Result};

use axum::Router;
use keeper_purge::PurgeExecutor;
use keeper_scheduler::Scheduler;
use keeper_store::Store;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Keeper API",
    description = "Build history and retention",
    license(name = "AGPL-3.0-or-later"),
))]
struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub scheduler: Arc<dyn Scheduler>,
    pub purge: Arc<PurgeExecutor>,
}

#[utoipa::path(get, path = "/health", responses((status = OK, body = str)))]
async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(utoipa_axum::routes!(health))
        .routes(utoipa_axum::routes!(jobs::list_jobs))
        .routes(utoipa_axum::routes!(builds::list_builds, builds::schedule_build))
        .routes(utoipa_axum::routes!(builds::set_keep))
        .routes(utoipa_axum::routes!(builds::cancel_build))
        .routes(utoipa_axum::routes!(purge::purge_job))
        .with_state(state)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", api))
        .layer(TraceLayer::new_for_http())
}
