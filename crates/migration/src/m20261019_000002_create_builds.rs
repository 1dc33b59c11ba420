use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Builds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Builds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Builds::JobName).text().not_null())
                    .col(ColumnDef::new(Builds::Number).integer().not_null())
                    .col(
                        ColumnDef::new(Builds::Status)
                            .text()
                            .not_null()
                            .default("queued"),
                    )
                    .col(ColumnDef::new(Builds::Result).text())
                    .col(
                        ColumnDef::new(Builds::KeptForever)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Builds::ErrorMessage).text())
                    .col(
                        ColumnDef::new(Builds::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Builds::StartedAt).timestamp())
                    .col(ColumnDef::new(Builds::FinishedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_builds_job")
                            .from(Builds::Table, Builds::JobName)
                            .to(Jobs::Table, Jobs::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_builds_job_number")
                    .table(Builds::Table)
                    .col(Builds::JobName)
                    .col(Builds::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_builds_status")
                    .table(Builds::Table)
                    .col(Builds::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Builds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Builds {
    Table,
    Id,
    JobName,
    Number,
    Status,
    Result,
    KeptForever,
    ErrorMessage,
    CreatedAt,
    StartedAt,
    FinishedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Name,
}
