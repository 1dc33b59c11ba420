pub mod builds;
pub mod counter;
pub mod error;
pub mod jobs;
pub mod locks;

pub use counter::FIRST_BUILD_NUMBER;
pub use error::{Result, StoreError};
pub use locks::JobLocks;

use sea_orm::DatabaseConnection;
use tokio::sync::OwnedMutexGuard;

pub struct Store {
    db: DatabaseConnection,
    locks: JobLocks,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            locks: JobLocks::default(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn jobs(&self) -> jobs::JobRepository<'_> {
        jobs::JobRepository::new(&self.db)
    }

    pub fn builds(&self) -> builds::BuildRepository<'_> {
        builds::BuildRepository::new(&self.db)
    }

    /// Serializes purges and build scheduling on a single job.
    pub async fn lock_job(&self, job_name: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(job_name).await
    }
}
