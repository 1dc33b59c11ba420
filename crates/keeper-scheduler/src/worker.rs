use crate::error::Result;
use crate::runner::RunOutcome;
use crate::WorkerConfig;
use entity::sea_orm_active_enums::BuildResult;
use keeper_store::StoreError;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn process_build(build_id: i32, config: Arc<WorkerConfig>) -> Result<()> {
    info!("Processing build {}", build_id);

    // Registered before the build is marked running so a cancel request
    // can never find a running build without a handle.
    let cancel = config.executions.register(build_id).await;
    let result = run_build(build_id, &config, cancel).await;
    config.executions.remove(build_id).await;

    result
}

async fn run_build(
    build_id: i32,
    config: &WorkerConfig,
    cancel: tokio_util::sync::CancellationToken,
) -> Result<()> {
    let Some(build) = config.store.builds().find_by_id(build_id).await? else {
        warn!("Build {} no longer exists, skipping", build_id);
        return Ok(());
    };

    let job = config
        .store
        .jobs()
        .find_by_name(&build.job_name)
        .await?
        .ok_or_else(|| StoreError::JobNotFound(build.job_name.clone()))?;

    if !config.store.builds().mark_running(build.id).await? {
        info!(
            "Build {}#{} left the queue before starting, skipping",
            build.job_name, build.number
        );
        return Ok(());
    }

    info!("Started build {}#{}", build.job_name, build.number);

    let outcome = match config.runner.run(&job, &build, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(
                "Runner failed for build {}#{}: {}",
                build.job_name, build.number, e
            );
            RunOutcome::Failed(e.to_string())
        }
    };

    let (result, error_message) = match outcome {
        RunOutcome::Succeeded => (BuildResult::Success, None),
        RunOutcome::Failed(message) => (BuildResult::Failure, Some(message)),
        RunOutcome::Cancelled => (BuildResult::Aborted, None),
    };

    match config
        .store
        .builds()
        .mark_finished(build.id, result, error_message)
        .await?
    {
        Some(_) => info!(
            "Build {}#{} finished: {:?}",
            build.job_name, build.number, result
        ),
        None => warn!(
            "Build {}#{} was deleted while running",
            build.job_name, build.number
        ),
    }

    Ok(())
}
