//! Create `timeline_phase` table; phases cascade with their timeline.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimelinePhase::Table)
                    .if_not_exists()
                    .col(uuid(TimelinePhase::Id).primary_key())
                    .col(uuid(TimelinePhase::TenantId).not_null())
                    .col(uuid(TimelinePhase::TimelineId).not_null())
                    .col(string_len(TimelinePhase::Name, 128).not_null())
                    .col(date(TimelinePhase::StartDate).not_null())
                    .col(date(TimelinePhase::EndDate).not_null())
                    .col(integer(TimelinePhase::SortOrder).not_null().default(0))
                    .col(timestamp_with_time_zone(TimelinePhase::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(TimelinePhase::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_phase_tenant")
                            .from(TimelinePhase::Table, TimelinePhase::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_phase_timeline")
                            .from(TimelinePhase::Table, TimelinePhase::TimelineId)
                            .to(Timeline::Table, Timeline::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TimelinePhase::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TimelinePhase { Table, Id, TenantId, TimelineId, Name, StartDate, EndDate, SortOrder, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Timeline { Table, Id }
