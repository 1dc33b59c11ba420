mod channels;
mod config;
mod reconcile;
mod signal;

use keeper_api::AppState;
use keeper_config::constants;
use keeper_purge::PurgeExecutor;
use keeper_scheduler::{Executions, LocalScheduler};
use keeper_store::Store;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let db = Database::connect(&database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let store = Arc::new(Store::new(db));

    tracing::info!("Database migrations complete");

    if let Err(e) = reconcile::reconcile_jobs(&store, &config::jobs_config_path()).await {
        tracing::error!("Job reconciliation failed: {}", e);
        return Err(e);
    }

    let channels = channels::create_channels();
    let executions = Executions::default();

    let worker_config = config::create_worker_config(store.clone(), executions.clone());
    let worker_handle = tokio::spawn(keeper_scheduler::run_worker_pool(
        channels.build_rx,
        worker_config,
    ));

    if let Err(e) = reconcile::reconcile_builds(&store, &channels.build_tx).await {
        tracing::error!("Startup build reconciliation failed: {}", e);
    }

    let scheduler = Arc::new(LocalScheduler::new(
        store.clone(),
        channels.build_tx,
        executions,
    ));
    let purge = Arc::new(PurgeExecutor::new(
        store.clone(),
        scheduler.clone(),
        config::create_purge_settings(),
    ));

    let api_router = keeper_api::router(AppState {
        store,
        scheduler,
        purge,
    });

    let api_host = std::env::var("API_HOST").unwrap_or_else(|_| constants::DEFAULT_API_HOST.into());
    let api_port = std::env::var("API_PORT").unwrap_or_else(|_| constants::DEFAULT_API_PORT.into());
    let api_addr = format!("{api_host}:{api_port}");

    tracing::info!("Starting API server on {api_addr}");
    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, api_router)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await?;

    // The router held the last scheduler, so the build channel is closed now.
    tokio::select! {
        _ = tokio::time::sleep(constants::SHUTDOWN_TIMEOUT) => {
            tracing::warn!("Shutdown timeout reached, forcing exit");
        }
        _ = worker_handle => {
            tracing::info!("All components shut down gracefully");
        }
    }

    tracing::info!("Keeper shutdown complete");

    Ok(())
}
