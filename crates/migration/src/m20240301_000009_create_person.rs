//! Create `person` table.
//!
//! Directory records with a `kind` discriminator: team members and project managers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Person::Table)
                    .if_not_exists()
                    .col(uuid(Person::Id).primary_key())
                    .col(uuid(Person::TenantId).not_null())
                    .col(string_len(Person::Kind, 32).not_null())
                    .col(string_len(Person::FullName, 128).not_null())
                    .col(string_len_null(Person::Email, 255))
                    .col(string_len_null(Person::Title, 128))
                    .col(uuid_null(Person::UserId))
                    .col(uuid_null(Person::TeamId))
                    .col(timestamp_with_time_zone(Person::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Person::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_tenant")
                            .from(Person::Table, Person::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_user")
                            .from(Person::Table, Person::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_team")
                            .from(Person::Table, Person::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Person::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Person { Table, Id, TenantId, Kind, FullName, Email, Title, UserId, TeamId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Team { Table, Id }
