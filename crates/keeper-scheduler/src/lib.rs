mod error;
mod executions;
mod runner;
mod scheduler;
mod worker;

pub use error::{Result, SchedulerError};
pub use executions::Executions;
pub use runner::{BuildRunner, CommandRunner, RunOutcome};
pub use scheduler::{LocalScheduler, Scheduler};

use keeper_store::Store;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info};

#[derive(Clone)]
pub struct WorkerConfig {
    pub store: Arc<Store>,
    pub runner: Arc<dyn BuildRunner>,
    pub executions: Executions,
    pub max_concurrent_builds: usize,
}

pub async fn run_worker_pool(mut build_rx: mpsc::Receiver<i32>, config: WorkerConfig) {
    info!(
        "Starting build worker pool with max_concurrent_builds={}",
        config.max_concurrent_builds
    );

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_builds));
    let config = Arc::new(config);

    while let Some(build_id) = build_rx.recv().await {
        info!("Received build request for build {}", build_id);

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            error!("Worker pool semaphore closed");
            break;
        };
        let config = config.clone();

        tokio::spawn(async move {
            if let Err(e) = worker::process_build(build_id, config).await {
                error!("Build {} failed: {}", build_id, e);
            }
            drop(permit);
        });
    }

    info!("Build worker pool shutting down");
}
