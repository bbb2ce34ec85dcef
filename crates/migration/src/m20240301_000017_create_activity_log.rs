//! Create `activity_log` table (append-only).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(uuid(ActivityLog::Id).primary_key())
                    .col(uuid(ActivityLog::TenantId).not_null())
                    .col(uuid_null(ActivityLog::UserId))
                    .col(string_len(ActivityLog::EntityType, 64).not_null())
                    .col(uuid(ActivityLog::EntityId).not_null())
                    .col(string_len(ActivityLog::Action, 32).not_null())
                    .col(json_binary_null(ActivityLog::Details))
                    .col(timestamp_with_time_zone(ActivityLog::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_log_tenant")
                            .from(ActivityLog::Table, ActivityLog::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActivityLog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ActivityLog { Table, Id, TenantId, UserId, EntityType, EntityId, Action, Details, CreatedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }
