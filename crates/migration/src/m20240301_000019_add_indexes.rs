use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns, unique)
const INDEXES: &[(&str, &str, &[&str], bool)] = &[
    ("uniq_user_tenant_email", "user", &["tenant_id", "email"], true),
    ("uniq_role_tenant_name", "role", &["tenant_id", "name"], true),
    ("uniq_role_permission", "role_permission", &["role_id", "permission"], true),
    ("uniq_user_role", "user_role", &["user_id", "role_id"], true),
    ("uniq_user_team", "user_team", &["team_id", "user_id"], true),
    ("idx_team_tenant", "team", &["tenant_id"], false),
    ("idx_person_tenant_kind", "person", &["tenant_id", "kind"], false),
    ("idx_project_tenant_status", "project", &["tenant_id", "status"], false),
    ("idx_duty_project", "project_duty", &["project_id"], false),
    ("idx_duty_assignee", "project_duty", &["assignee_id"], false),
    ("idx_timeline_project", "timeline", &["project_id"], false),
    ("idx_phase_timeline", "timeline_phase", &["timeline_id"], false),
    ("idx_milestone_project", "milestone", &["project_id"], false),
    ("idx_document_project", "document", &["project_id"], false),
    ("idx_comment_duty", "comment", &["duty_id"], false),
    ("idx_activity_entity", "activity_log", &["tenant_id", "entity_type", "entity_id"], false),
    ("idx_activity_created", "activity_log", &["created_at"], false),
    ("idx_notification_user_read", "notification", &["user_id", "is_read"], false),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, cols, unique) in INDEXES {
            let mut idx = Index::create();
            idx.name(*name).table(Alias::new(*table)).if_not_exists();
            for c in *cols {
                idx.col(Alias::new(*c));
            }
            if *unique {
                idx.unique();
            }
            manager.create_index(idx.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _, _) in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
