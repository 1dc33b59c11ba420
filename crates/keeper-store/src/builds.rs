use ::entity::{
    builds,
    prelude::*,
    sea_orm_active_enums::{BuildResult, BuildStatus},
};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::StoreError;

pub struct BuildRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BuildRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<builds::Model>, DbErr> {
        Builds::find_by_id(id).one(self.db).await
    }

    pub async fn find_by_job_and_number(
        &self,
        job_name: &str,
        number: i32,
    ) -> Result<Option<builds::Model>, DbErr> {
        Builds::find()
            .filter(builds::Column::JobName.eq(job_name))
            .filter(builds::Column::Number.eq(number))
            .one(self.db)
            .await
    }

    /// Builds of a job, oldest first.
    pub async fn list_by_job(&self, job_name: &str) -> Result<Vec<builds::Model>, DbErr> {
        Builds::find()
            .filter(builds::Column::JobName.eq(job_name))
            .order_by_asc(builds::Column::Number)
            .all(self.db)
            .await
    }

    pub async fn list_by_status(&self, status: BuildStatus) -> Result<Vec<builds::Model>, DbErr> {
        Builds::find()
            .filter(builds::Column::Status.eq(status))
            .order_by_asc(builds::Column::Id)
            .all(self.db)
            .await
    }

    pub async fn max_number(&self, job_name: &str) -> Result<Option<i32>, DbErr> {
        Ok(Builds::find()
            .filter(builds::Column::JobName.eq(job_name))
            .order_by_desc(builds::Column::Number)
            .one(self.db)
            .await?
            .map(|b| b.number))
    }

    pub async fn create(&self, build: builds::ActiveModel) -> Result<builds::Model, DbErr> {
        build.insert(self.db).await
    }

    pub async fn create_queued(
        &self,
        job_name: &str,
        number: i32,
    ) -> Result<builds::Model, DbErr> {
        self.create(builds::ActiveModel {
            job_name: Set(job_name.to_string()),
            number: Set(number),
            status: Set(BuildStatus::Queued),
            result: Set(None),
            kept_forever: Set(false),
            error_message: Set(None),
            created_at: Set(chrono::Utc::now().naive_utc()),
            started_at: Set(None),
            finished_at: Set(None),
            ..Default::default()
        })
        .await
    }

    pub async fn update(&self, build: builds::ActiveModel) -> Result<builds::Model, DbErr> {
        build.update(self.db).await
    }

    /// Moves a queued build to running. False when it is no longer queued.
    pub async fn mark_running(&self, id: i32) -> Result<bool, DbErr> {
        let result = Builds::update_many()
            .col_expr(builds::Column::Status, Expr::value(BuildStatus::Running))
            .col_expr(
                builds::Column::StartedAt,
                Expr::value(chrono::Utc::now().naive_utc()),
            )
            .filter(builds::Column::Id.eq(id))
            .filter(builds::Column::Status.eq(BuildStatus::Queued))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Finishes a build that never started. False when it already left the queue.
    pub async fn abort_queued(&self, id: i32) -> Result<bool, DbErr> {
        let result = Builds::update_many()
            .col_expr(builds::Column::Status, Expr::value(BuildStatus::Finished))
            .col_expr(builds::Column::Result, Expr::value(BuildResult::Aborted))
            .col_expr(
                builds::Column::FinishedAt,
                Expr::value(chrono::Utc::now().naive_utc()),
            )
            .filter(builds::Column::Id.eq(id))
            .filter(builds::Column::Status.eq(BuildStatus::Queued))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Returns `None` if the build disappeared in the meantime.
    pub async fn mark_finished(
        &self,
        id: i32,
        result: BuildResult,
        error_message: Option<String>,
    ) -> Result<Option<builds::Model>, DbErr> {
        let Some(build) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active = build.into_active_model();
        active.status = Set(BuildStatus::Finished);
        active.result = Set(Some(result));
        active.error_message = Set(error_message);
        active.finished_at = Set(Some(chrono::Utc::now().naive_utc()));

        self.update(active).await.map(Some)
    }

    pub async fn delete(&self, job_name: &str, number: i32) -> crate::Result<()> {
        let result = Builds::delete_many()
            .filter(builds::Column::JobName.eq(job_name))
            .filter(builds::Column::Number.eq(number))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::BuildNotFound {
                job: job_name.to_string(),
                number,
            });
        }

        Ok(())
    }

    /// Deletes the build unless it is running. Returns `false` when the
    /// build exists but is running.
    pub async fn delete_unless_running(&self, job_name: &str, number: i32) -> crate::Result<bool> {
        let result = Builds::delete_many()
            .filter(builds::Column::JobName.eq(job_name))
            .filter(builds::Column::Number.eq(number))
            .filter(builds::Column::Status.ne(BuildStatus::Running))
            .exec(self.db)
            .await?;

        if result.rows_affected > 0 {
            return Ok(true);
        }

        match self.find_by_job_and_number(job_name, number).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::BuildNotFound {
                job: job_name.to_string(),
                number,
            }),
        }
    }

    pub async fn mark_kept_forever(
        &self,
        job_name: &str,
        number: i32,
        keep: bool,
    ) -> crate::Result<builds::Model> {
        let build = self
            .find_by_job_and_number(job_name, number)
            .await?
            .ok_or_else(|| StoreError::BuildNotFound {
                job: job_name.to_string(),
                number,
            })?;

        if build.kept_forever == keep {
            return Ok(build);
        }

        let mut active = build.into_active_model();
        active.kept_forever = Set(keep);

        Ok(self.update(active).await?)
    }
}
