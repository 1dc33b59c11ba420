#![allow(dead_code)]

use entity::builds;
use entity::sea_orm_active_enums::BuildStatus;
use keeper_scheduler::{BuildRunner, Executions, LocalScheduler, WorkerConfig, run_worker_pool};
use keeper_store::Store;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
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
