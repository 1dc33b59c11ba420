use crate::error::{PurgeError, Result};
use crate::policy::{self, Decision};
use crate::request::PurgeRequest;
use crate::result::PurgeResult;
use entity::builds;
use entity::sea_orm_active_enums::BuildStatus;
use keeper_config::{build_log_path, constants};
use keeper_scheduler::{Scheduler, SchedulerError};
use keeper_store::{FIRST_BUILD_NUMBER, Store, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PurgeSettings {
    /// Upper bound on waiting for a cancelled build to stop.
    pub cancel_timeout: Duration,
    pub cancel_poll_interval: Duration,
    /// Where build logs live; `None` leaves log files alone.
    pub logs_dir: Option<PathBuf>,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            cancel_timeout: constants::CANCEL_TIMEOUT,
            cancel_poll_interval: constants::CANCEL_POLL_INTERVAL,
            logs_dir: None,
        }
    }
}

pub struct PurgeExecutor {
    store: Arc<Store>,
    scheduler: Arc<dyn Scheduler>,
    settings: PurgeSettings,
}

impl PurgeExecutor {
    pub fn new(store: Arc<Store>, scheduler: Arc<dyn Scheduler>, settings: PurgeSettings) -> Self {
        Self {
            store,
            scheduler,
            settings,
        }
    }

    pub async fn execute(&self, request: &PurgeRequest) -> Result<PurgeResult> {
        request.validate()?;
        self.purge(&request.job_id, request.reset_next_build, request.force)
            .await
    }

    /// Deletes every build of the job the retention policy allows.
    ///
    /// Per-build failures are recorded in the result and never stop the
    /// purge. Only an unknown job, a store failure before any build was
    /// touched, or a failed counter reset end the call with an error, and
    /// none of them undo deletions already made.
    pub async fn purge(
        &self,
        job_name: &str,
        reset_next_build: bool,
        force: bool,
    ) -> Result<PurgeResult> {
        let _guard = self.store.lock_job(job_name).await;

        self.store
            .jobs()
            .find_by_name(job_name)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| PurgeError::JobNotFound(job_name.to_string()))?;

        let snapshot = self
            .store
            .builds()
            .list_by_job(job_name)
            .await
            .map_err(StoreError::from)?;

        info!(
            "Purging {} build(s) of {} (reset_next_build={}, force={})",
            snapshot.len(),
            job_name,
            reset_next_build,
            force
        );

        let mut result = PurgeResult::new(job_name);

        for build in &snapshot {
            match self.purge_build(build, force).await {
                Ok(()) => result.record_deleted(),
                Err(e) => {
                    let Some(reason) = e.skip_reason() else {
                        return Err(e);
                    };
                    warn!("Skipping build {}#{}: {}", job_name, build.number, e);
                    result.record_skipped(build.number, reason, e.to_string());
                }
            }
        }

        if reset_next_build {
            let next = self.reset_counter(job_name).await.map_err(|source| {
                PurgeError::CounterResetFailed {
                    job: job_name.to_string(),
                    deleted: result.deleted_count,
                    source,
                }
            })?;
            info!("Next build number of {} reset to {}", job_name, next);
            result.counter_reset = true;
        }

        result.next_build_number = self.store.next_build_number(job_name).await?;

        info!(
            "Purge of {} complete: {} deleted, {} skipped",
            job_name, result.deleted_count, result.skipped_count
        );

        Ok(result)
    }

    async fn purge_build(&self, build: &builds::Model, force: bool) -> Result<()> {
        // The snapshot may predate the build starting.
        let running = self.scheduler.is_running(build).await.map_err(|source| {
            PurgeError::StatusCheckFailed {
                job: build.job_name.clone(),
                number: build.number,
                source,
            }
        })?;

        let mut current = build.clone();
        if running {
            current.status = BuildStatus::Running;
        }
        self.check_policy(&current, force)?;

        if running {
            self.stop_build(build).await?;
        }

        // Workers start builds without the job lock, so the build may have
        // started since the check above.
        if !self.delete_idle(build).await? {
            current.status = BuildStatus::Running;
            self.check_policy(&current, force)?;

            self.stop_build(build).await?;
            self.store
                .builds()
                .delete(&build.job_name, build.number)
                .await
                .map_err(|source| deletion_failed(build, source))?;
        }

        info!("Deleted build {}#{}", build.job_name, build.number);
        self.remove_log(build).await;

        Ok(())
    }

    fn check_policy(&self, build: &builds::Model, force: bool) -> Result<()> {
        match policy::evaluate(build, force) {
            Decision::Allowed => Ok(()),
            Decision::Refused(reason) => Err(PurgeError::BuildNotDeletable {
                job: build.job_name.clone(),
                number: build.number,
                reason,
            }),
        }
    }

    /// Returns `false` when the build is running and was left in place.
    async fn delete_idle(&self, build: &builds::Model) -> Result<bool> {
        self.store
            .builds()
            .delete_unless_running(&build.job_name, build.number)
            .await
            .map_err(|source| deletion_failed(build, source))
    }

    /// Cancels a running build and waits, bounded, for it to stop.
    async fn stop_build(&self, build: &builds::Model) -> Result<()> {
        match self.scheduler.cancel_build(build).await {
            Ok(()) => {}
            // finished on its own in the meantime
            Err(SchedulerError::NotCancellable { .. }) => return Ok(()),
            Err(source) => return Err(self.cancellation_failed(build, source)),
        }

        let stopped = async {
            loop {
                if !self.scheduler.is_running(build).await? {
                    return Ok::<(), SchedulerError>(());
                }
                tokio::time::sleep(self.settings.cancel_poll_interval).await;
            }
        };

        match tokio::time::timeout(self.settings.cancel_timeout, stopped).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(self.cancellation_failed(build, source)),
            Err(_) => Err(PurgeError::CancellationTimeout {
                job: build.job_name.clone(),
                number: build.number,
                timeout: self.settings.cancel_timeout,
            }),
        }
    }

    /// Derives the counter from the builds that actually survived.
    async fn reset_counter(&self, job_name: &str) -> std::result::Result<i32, StoreError> {
        let next = self
            .store
            .builds()
            .max_number(job_name)
            .await?
            .map_or(FIRST_BUILD_NUMBER, |n| n + 1);

        self.store.reset_next_build_number(job_name, next).await?;
        Ok(next)
    }

    async fn remove_log(&self, build: &builds::Model) {
        let Some(logs_dir) = &self.settings.logs_dir else {
            return;
        };

        let log_file = build_log_path(logs_dir, &build.job_name, build.number);
        match tokio::fs::remove_file(&log_file).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove build log {:?}: {}", log_file, e),
        }
    }

    fn cancellation_failed(&self, build: &builds::Model, source: SchedulerError) -> PurgeError {
        PurgeError::CancellationFailed {
            job: build.job_name.clone(),
            number: build.number,
            source,
        }
    }
}

fn deletion_failed(build: &builds::Model, source: StoreError) -> PurgeError {
    PurgeError::BuildDeletionFailed {
        job: build.job_name.clone(),
        number: build.number,
        source,
    }
}
