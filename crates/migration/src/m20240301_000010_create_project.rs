//! Create `project` table (soft-deletable).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::TenantId).not_null())
                    .col(string_len(Project::Name, 200).not_null())
                    .col(text_null(Project::Description))
                    .col(string_len(Project::Status, 32).not_null())
                    .col(uuid_null(Project::TeamId))
                    .col(uuid_null(Project::ManagerId))
                    .col(date_null(Project::StartDate))
                    .col(date_null(Project::EndDate))
                    .col(timestamp_with_time_zone(Project::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Project::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Project::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tenant")
                            .from(Project::Table, Project::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_team")
                            .from(Project::Table, Project::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_manager")
                            .from(Project::Table, Project::ManagerId)
                            .to(Person::Table, Person::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Project::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
    TenantId,
    Name,
    Description,
    Status,
    TeamId,
    ManagerId,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Team { Table, Id }

#[derive(DeriveIden)]
enum Person { Table, Id }
