//! Create `timeline` table; a project may have several.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Timeline::Table)
                    .if_not_exists()
                    .col(uuid(Timeline::Id).primary_key())
                    .col(uuid(Timeline::TenantId).not_null())
                    .col(uuid(Timeline::ProjectId).not_null())
                    .col(string_len(Timeline::Name, 128).not_null())
                    .col(date(Timeline::StartDate).not_null())
                    .col(date(Timeline::EndDate).not_null())
                    .col(timestamp_with_time_zone(Timeline::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Timeline::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_tenant")
                            .from(Timeline::Table, Timeline::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_project")
                            .from(Timeline::Table, Timeline::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Timeline::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Timeline { Table, Id, TenantId, ProjectId, Name, StartDate, EndDate, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Project { Table, Id }
