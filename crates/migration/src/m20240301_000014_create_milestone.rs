//! Create `milestone` table; the timeline link is optional.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Milestone::Table)
                    .if_not_exists()
                    .col(uuid(Milestone::Id).primary_key())
                    .col(uuid(Milestone::TenantId).not_null())
                    .col(uuid(Milestone::ProjectId).not_null())
                    .col(uuid_null(Milestone::TimelineId))
                    .col(string_len(Milestone::Name, 128).not_null())
                    .col(text_null(Milestone::Description))
                    .col(date(Milestone::DueDate).not_null())
                    .col(boolean(Milestone::IsCompleted).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Milestone::CompletedAt))
                    .col(timestamp_with_time_zone(Milestone::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Milestone::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestone_tenant")
                            .from(Milestone::Table, Milestone::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestone_project")
                            .from(Milestone::Table, Milestone::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestone_timeline")
                            .from(Milestone::Table, Milestone::TimelineId)
                            .to(Timeline::Table, Timeline::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Milestone::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Milestone {
    Table,
    Id,
    TenantId,
    ProjectId,
    TimelineId,
    Name,
    Description,
    DueDate,
    IsCompleted,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Project { Table, Id }

#[derive(DeriveIden)]
enum Timeline { Table, Id }
