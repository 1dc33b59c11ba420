#![allow(dead_code)]

use entity::builds;
use entity::sea_orm_active_enums::{BuildResult, BuildStatus};
use keeper_store::Store;
use migration::MigratorTrait;
use sea_orm::{ActiveValue::Set, Database, IntoActiveModel};
use tempfile::NamedTempFile;

/// SQLite database in a temp file, migrated, removed on drop.
pub struct TestDb {
    pub store: Store,
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
            store: Store::new(db),
            _temp_file: temp_file,
        }
    }
}

pub async fn create_test_job(store: &Store, name: &str) {
    store
        .jobs()
        .create_job(name, "true")
        .await
        .expect("Failed to create job");
}

/// Allocates the next number the way the scheduler does and stores a
/// finished build.
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
