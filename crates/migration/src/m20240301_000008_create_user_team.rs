//! Create `user_team` membership table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTeam::Table)
                    .if_not_exists()
                    .col(uuid(UserTeam::Id).primary_key())
                    .col(uuid(UserTeam::TenantId).not_null())
                    .col(uuid(UserTeam::UserId).not_null())
                    .col(uuid(UserTeam::TeamId).not_null())
                    .col(timestamp_with_time_zone(UserTeam::JoinedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_team_user")
                            .from(UserTeam::Table, UserTeam::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_team_team")
                            .from(UserTeam::Table, UserTeam::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserTeam::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserTeam { Table, Id, TenantId, UserId, TeamId, JoinedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Team { Table, Id }
