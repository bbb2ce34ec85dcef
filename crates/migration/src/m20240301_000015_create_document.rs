//! Create `document` table. Only metadata and a URL are stored.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(uuid(Document::Id).primary_key())
                    .col(uuid(Document::TenantId).not_null())
                    .col(uuid(Document::ProjectId).not_null())
                    .col(uuid_null(Document::DutyId))
                    .col(string_len(Document::Name, 255).not_null())
                    .col(text(Document::Url).not_null())
                    .col(string_len(Document::ContentType, 128).not_null())
                    .col(big_integer(Document::SizeBytes).not_null().default(0))
                    .col(uuid(Document::UploadedBy).not_null())
                    .col(timestamp_with_time_zone(Document::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Document::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_tenant")
                            .from(Document::Table, Document::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_project")
                            .from(Document::Table, Document::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_duty")
                            .from(Document::Table, Document::DutyId)
                            .to(ProjectDuty::Table, ProjectDuty::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Document::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Document {
    Table,
    Id,
    TenantId,
    ProjectId,
    DutyId,
    Name,
    Url,
    ContentType,
    SizeBytes,
    UploadedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum Project { Table, Id }

#[derive(DeriveIden)]
enum ProjectDuty { Table, Id }
