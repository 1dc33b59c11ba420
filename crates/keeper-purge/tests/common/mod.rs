#![allow(dead_code)]

use async_trait::async_trait;
use entity::builds;
use entity::sea_orm_active_enums::{BuildResult, BuildStatus};
use keeper_scheduler::{
    BuildRunner, Executions, LocalScheduler, Scheduler, SchedulerError, WorkerConfig,
    run_worker_pool,
};
use keeper_store::Store;
use migration::MigratorTrait;
use sea_orm::{ActiveValue::Set, Database, IntoActiveModel};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

pub struct TestDb {
    pub store: Arc<Store>,
    _temp_file: NamedTempFile,
}

impl TestDb {
    pub async fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        let db = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        Self {
            store: Arc::new(Store::new(db)),
            _temp_file: temp_file,
        }
    }
}

/// A job with `count` finished builds, numbered from 1.
pub async fn create_job_with_builds(
    store: &Store,
    job: &str,
    count: usize,
    kept_forever: bool,
) -> Vec<builds::Model> {
    store
        .jobs()
        .create_job(job, "true")
        .await
        .expect("Failed to create job");

    let mut created = Vec::new();
    for _ in 0..count {
        created.push(create_finished_build(store, job, kept_forever).await);
    }
    created
}

pub async fn create_finished_build(store: &Store, job: &str, kept_forever: bool) -> builds::Model {
    let number = store
        .next_and_increment(job)
        .await
        .expect("Failed to allocate build number");
    let build = store
        .builds()
        .create_queued(job, number)
        .await
        .expect("Failed to create build");

    let now = chrono::Utc::now().naive_utc();
    let mut active = build.into_active_model();
    active.status = Set(BuildStatus::Finished);
    active.result = Set(Some(BuildResult::Success));
    active.kept_forever = Set(kept_forever);
    active.started_at = Set(Some(now));
    active.finished_at = Set(Some(now));

    store
        .builds()
        .update(active)
        .await
        .expect("Failed to finish build")
}

/// Scheduler wired to a running worker pool.
pub fn start_scheduler(store: Arc<Store>, runner: Arc<dyn BuildRunner>) -> LocalScheduler {
    let (build_tx, build_rx) = mpsc::channel(16);
    let executions = Executions::default();

    tokio::spawn(run_worker_pool(
        build_rx,
        WorkerConfig {
            store: store.clone(),
            runner,
            executions: executions.clone(),
            max_concurrent_builds: 2,
        },
    ));

    LocalScheduler::new(store, build_tx, executions)
}

pub async fn wait_for_status(store: &Store, build_id: i32, status: BuildStatus) -> builds::Model {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Some(build) = store.builds().find_by_id(build_id).await.unwrap()
                && build.status == status
            {
                return build;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("build never reached the expected status")
}

/// Scheduler that reports builds from the store but whose cancellations
/// never take effect.
pub struct StuckScheduler {
    pub store: Arc<Store>,
    pub cancel_requests: AtomicUsize,
}

impl StuckScheduler {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            cancel_requests: AtomicUsize::new(0),
        }
    }

    pub fn cancel_requests(&self) -> usize {
        self.cancel_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scheduler for StuckScheduler {
    async fn schedule_build(&self, job_name: &str) -> keeper_scheduler::Result<builds::Model> {
        let number = self.store.next_and_increment(job_name).await?;
        Ok(self.store.builds().create_queued(job_name, number).await?)
    }

    async fn cancel_build(&self, _build: &builds::Model) -> keeper_scheduler::Result<()> {
        self.cancel_requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_running(&self, build: &builds::Model) -> keeper_scheduler::Result<bool> {
        Ok(self
            .store
            .builds()
            .find_by_id(build.id)
            .await?
            .map(|b| b.status == BuildStatus::Running)
            .unwrap_or(false))
    }
}

/// Scheduler whose status query deletes the build behind the purge's back,
/// so the store-level delete that follows finds nothing.
pub struct VanishingScheduler {
    pub store: Arc<Store>,
}

#[async_trait]
impl Scheduler for VanishingScheduler {
    async fn schedule_build(&self, _job_name: &str) -> keeper_scheduler::Result<builds::Model> {
        Err(SchedulerError::SchedulerUnavailable)
    }

    async fn cancel_build(&self, _build: &builds::Model) -> keeper_scheduler::Result<()> {
        Ok(())
    }

    async fn is_running(&self, build: &builds::Model) -> keeper_scheduler::Result<bool> {
        if build.number % 2 == 0 {
            self.store.builds().delete(&build.job_name, build.number).await?;
        }
        Ok(false)
    }
}

/// Scheduler whose worker starts each queued build right after the purge
/// has been told it is not running.
pub struct StartingScheduler {
    pub store: Arc<Store>,
    pub cancel_requests: AtomicUsize,
    seen: Mutex<HashSet<i32>>,
}

impl StartingScheduler {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            cancel_requests: AtomicUsize::new(0),
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn cancel_requests(&self) -> usize {
        self.cancel_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scheduler for StartingScheduler {
    async fn schedule_build(&self, job_name: &str) -> keeper_scheduler::Result<builds::Model> {
        let number = self.store.next_and_increment(job_name).await?;
        Ok(self.store.builds().create_queued(job_name, number).await?)
    }

    async fn cancel_build(&self, build: &builds::Model) -> keeper_scheduler::Result<()> {
        self.cancel_requests.fetch_add(1, Ordering::SeqCst);
        self.store
            .builds()
            .mark_finished(build.id, BuildResult::Aborted, None)
            .await?;
        Ok(())
    }

    async fn is_running(&self, build: &builds::Model) -> keeper_scheduler::Result<bool> {
        let status = self
            .store
            .builds()
            .find_by_id(build.id)
            .await?
            .map(|b| b.status);

        let first_look = self.seen.lock().unwrap().insert(build.id);
        if first_look && status == Some(BuildStatus::Queued) {
            self.store.builds().mark_running(build.id).await?;
        }

        Ok(status == Some(BuildStatus::Running))
    }
}

/// Scheduler that deletes the whole job when asked about build `drop_at`.
pub struct JobDroppingScheduler {
    pub store: Arc<Store>,
    pub drop_at: i32,
}

#[async_trait]
impl Scheduler for JobDroppingScheduler {
    async fn schedule_build(&self, _job_name: &str) -> keeper_scheduler::Result<builds::Model> {
        Err(SchedulerError::SchedulerUnavailable)
    }

    async fn cancel_build(&self, _build: &builds::Model) -> keeper_scheduler::Result<()> {
        Ok(())
    }

    async fn is_running(&self, build: &builds::Model) -> keeper_scheduler::Result<bool> {
        if build.number == self.drop_at {
            self.store.jobs().delete(&build.job_name).await?;
        }
        Ok(false)
    }
}

/// Scheduler that cannot report build status.
pub struct UnreachableScheduler;

#[async_trait]
impl Scheduler for UnreachableScheduler {
    async fn schedule_build(&self, _job_name: &str) -> keeper_scheduler::Result<builds::Model> {
        Err(SchedulerError::SchedulerUnavailable)
    }

    async fn cancel_build(&self, _build: &builds::Model) -> keeper_scheduler::Result<()> {
        Err(SchedulerError::SchedulerUnavailable)
    }

    async fn is_running(&self, _build: &builds::Model) -> keeper_scheduler::Result<bool> {
        Err(SchedulerError::SchedulerUnavailable)
    }
}
