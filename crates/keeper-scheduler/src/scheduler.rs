use crate::error::{Result, SchedulerError};
use crate::executions::Executions;
use async_trait::async_trait;
use entity::builds;
use entity::sea_orm_active_enums::{BuildResult, BuildStatus};
use keeper_store::{Store, StoreError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The scheduling side of the build system as seen by the purge subsystem.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn schedule_build(&self, job_name: &str) -> Result<builds::Model>;

    /// Requests termination. Returns once the request is delivered, not
    /// once the build has stopped; poll [`Scheduler::is_running`] for that.
    async fn cancel_build(&self, build: &builds::Model) -> Result<()>;

    async fn is_running(&self, build: &builds::Model) -> Result<bool>;
}

/// Queues builds in the store and hands them to the local worker pool.
#[derive(Clone)]
pub struct LocalScheduler {
    store: Arc<Store>,
    build_tx: mpsc::Sender<i32>,
    executions: Executions,
}

impl LocalScheduler {
    pub fn new(store: Arc<Store>, build_tx: mpsc::Sender<i32>, executions: Executions) -> Self {
        Self {
            store,
            build_tx,
            executions,
        }
    }
}

#[async_trait]
impl Scheduler for LocalScheduler {
    async fn schedule_build(&self, job_name: &str) -> Result<builds::Model> {
        let build = {
            let _guard = self.store.lock_job(job_name).await;
            let number = self.store.next_and_increment(job_name).await?;
            self.store.builds().create_queued(job_name, number).await?
        };

        info!("Queued build {}#{}", build.job_name, build.number);

        if self.build_tx.send(build.id).await.is_err() {
            // no worker will ever pick it up
            self.store.builds().abort_queued(build.id).await?;
            return Err(SchedulerError::SchedulerUnavailable);
        }

        Ok(build)
    }

    async fn cancel_build(&self, build: &builds::Model) -> Result<()> {
        let current = self
            .store
            .builds()
            .find_by_id(build.id)
            .await?
            .ok_or_else(|| StoreError::BuildNotFound {
                job: build.job_name.clone(),
                number: build.number,
            })?;

        if current.status == BuildStatus::Finished {
            return Err(SchedulerError::NotCancellable {
                job: current.job_name,
                number: current.number,
            });
        }

        if current.status == BuildStatus::Queued
            && self.store.builds().abort_queued(current.id).await?
        {
            info!(
                "Cancelled queued build {}#{}",
                current.job_name, current.number
            );
            return Ok(());
        }

        // running, or started between the read and the abort
        if self.executions.cancel(current.id).await {
            info!(
                "Cancellation requested for build {}#{}",
                current.job_name, current.number
            );
        } else {
            // left behind by a previous process, nothing to kill
            warn!(
                "Build {}#{} has no live execution, marking aborted",
                current.job_name, current.number
            );
            self.store
                .builds()
                .mark_finished(current.id, BuildResult::Aborted, None)
                .await?;
        }

        Ok(())
    }

    async fn is_running(&self, build: &builds::Model) -> Result<bool> {
        Ok(self
            .store
            .builds()
            .find_by_id(build.id)
            .await?
            .map(|b| b.status == BuildStatus::Running)
            .unwrap_or(false))
    }
}
