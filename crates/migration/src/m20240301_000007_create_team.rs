//! Create `team` table (soft-deletable).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(uuid(Team::TenantId).not_null())
                    .col(string_len(Team::Name, 128).not_null())
                    .col(text_null(Team::Description))
                    .col(timestamp_with_time_zone(Team::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Team::UpdatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Team::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_tenant")
                            .from(Team::Table, Team::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Team::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Team { Table, Id, TenantId, Name, Description, CreatedAt, UpdatedAt, DeletedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }
