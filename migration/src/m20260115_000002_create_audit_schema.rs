use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only activity log; rows are never updated or deleted
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLog::Timestamp).string().not_null())
                    .col(ColumnDef::new(ActivityLog::Action).string().not_null())
                    .col(ColumnDef::new(ActivityLog::Category).string().not_null())
                    .col(ColumnDef::new(ActivityLog::Outcome).string().not_null())
                    .col(ColumnDef::new(ActivityLog::ActorUserId).big_integer().null())
                    .col(ColumnDef::new(ActivityLog::ActorCompanyId).big_integer().null())
                    .col(ColumnDef::new(ActivityLog::ActorLabel).string().not_null())
                    .col(ColumnDef::new(ActivityLog::IpAddress).string().null())
                    .col(ColumnDef::new(ActivityLog::UserAgent).string().null())
                    .col(ColumnDef::new(ActivityLog::CorrelationId).string().not_null())
                    .col(ColumnDef::new(ActivityLog::Details).string().not_null())
                    .col(ColumnDef::new(ActivityLog::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_log_timestamp")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_log_action")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Action)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_log_actor_user_id")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::ActorUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_log_correlation_id")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CorrelationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActivityLog {
    Table,
    Id,
    Timestamp,
    Action,
    Category,
    Outcome,
    ActorUserId,
    ActorCompanyId,
    ActorLabel,
    IpAddress,
    UserAgent,
    CorrelationId,
    Details,
    CreatedBy,
}
