use ::entity::{jobs, prelude::*};
use sea_orm::*;

use crate::counter::FIRST_BUILD_NUMBER;

pub struct JobRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> JobRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<jobs::Model>, DbErr> {
        Jobs::find_by_id(name).one(self.db).await
    }

    pub async fn list_all(&self) -> Result<Vec<jobs::Model>, DbErr> {
        Jobs::find()
            .order_by_asc(jobs::Column::Name)
            .all(self.db)
            .await
    }

    pub async fn create(&self, job: jobs::ActiveModel) -> Result<jobs::Model, DbErr> {
        job.insert(self.db).await
    }

    pub async fn create_job(&self, name: &str, command: &str) -> Result<jobs::Model, DbErr> {
        let now = chrono::Utc::now().naive_utc();

        self.create(jobs::ActiveModel {
            name: Set(name.to_string()),
            command: Set(command.to_string()),
            next_build_number: Set(FIRST_BUILD_NUMBER),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .await
    }

    pub async fn update(&self, job: jobs::ActiveModel) -> Result<jobs::Model, DbErr> {
        job.update(self.db).await
    }

    pub async fn update_command(&self, name: &str, command: &str) -> crate::Result<jobs::Model> {
        let job = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| crate::StoreError::JobNotFound(name.to_string()))?;

        let mut active = job.into_active_model();
        active.command = Set(command.to_string());
        active.updated_at = Set(chrono::Utc::now().naive_utc());

        Ok(self.update(active).await?)
    }

    /// Deletes the job; its builds go with it.
    pub async fn delete(&self, name: &str) -> Result<DeleteResult, DbErr> {
        Jobs::delete_by_id(name).exec(self.db).await
    }
}
