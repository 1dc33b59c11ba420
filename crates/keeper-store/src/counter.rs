use ::entity::{builds, jobs, prelude::*};
use sea_orm::*;

use crate::{Result, Store, StoreError};

pub const FIRST_BUILD_NUMBER: i32 = 1;

/// Next-build-number bookkeeping. Callers hold the job lock from
/// [`Store::lock_job`] so the read-modify-write cannot interleave with
/// scheduling or another purge on the same job.
impl Store {
    pub async fn next_build_number(&self, job_name: &str) -> Result<i32> {
        Ok(Jobs::find_by_id(job_name)
            .one(self.db())
            .await?
            .ok_or_else(|| StoreError::JobNotFound(job_name.to_string()))?
            .next_build_number)
    }

    /// Hands out the current counter value and advances it by one.
    pub async fn next_and_increment(&self, job_name: &str) -> Result<i32> {
        let txn = self.db().begin().await?;

        let job = Jobs::find_by_id(job_name)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(job_name.to_string()))?;

        let number = job.next_build_number;
        let mut active: jobs::ActiveModel = job.into();
        active.next_build_number = Set(number + 1);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(number)
    }

    /// Sets the counter. Rejected when it would collide with a build that
    /// still exists.
    pub async fn reset_next_build_number(&self, job_name: &str, value: i32) -> Result<()> {
        let txn = self.db().begin().await?;

        let job = Jobs::find_by_id(job_name)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(job_name.to_string()))?;

        let highest = Builds::find()
            .filter(builds::Column::JobName.eq(job_name))
            .order_by_desc(builds::Column::Number)
            .one(&txn)
            .await?
            .map(|b| b.number);

        let min_allowed = highest.map_or(FIRST_BUILD_NUMBER, |n| n + 1);
        if value < min_allowed {
            return Err(StoreError::InvalidCounterValue {
                job: job_name.to_string(),
                value,
                min_allowed,
            });
        }

        let mut active: jobs::ActiveModel = job.into();
        active.next_build_number = Set(value);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
