//! Create `project_duty` table: work items of a project (soft-deletable).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectDuty::Table)
                    .if_not_exists()
                    .col(uuid(ProjectDuty::Id).primary_key())
                    .col(uuid(ProjectDuty::TenantId).not_null())
                    .col(uuid(ProjectDuty::ProjectId).not_null())
                    .col(string_len(ProjectDuty::Title, 200).not_null())
                    .col(text_null(ProjectDuty::Description))
                    .col(string_len(ProjectDuty::Status, 32).not_null())
                    .col(string_len(ProjectDuty::Priority, 32).not_null())
                    .col(uuid_null(ProjectDuty::AssigneeId))
                    .col(date_null(ProjectDuty::DueDate))
                    .col(timestamp_with_time_zone_null(ProjectDuty::CompletedAt))
                    .col(timestamp_with_time_zone(ProjectDuty::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ProjectDuty::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(ProjectDuty::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_duty_tenant")
                            .from(ProjectDuty::Table, ProjectDuty::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_duty_project")
                            .from(ProjectDuty::Table, ProjectDuty::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_duty_assignee")
                            .from(ProjectDuty::Table, ProjectDuty::AssigneeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProjectDuty::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProjectDuty {
    Table,
    Id,
    TenantId,
    ProjectId,
    Title,
    Description,
    Status,
    Priority,
    AssigneeId,
    DueDate,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Project { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
