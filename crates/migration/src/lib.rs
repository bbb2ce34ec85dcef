//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_tenant;
mod m20240301_000002_create_user;
mod m20240301_000003_create_user_credentials;
mod m20240301_000004_create_role;
mod m20240301_000005_create_role_permission;
mod m20240301_000006_create_user_role;
mod m20240301_000007_create_team;
mod m20240301_000008_create_user_team;
mod m20240301_000009_create_person;
mod m20240301_000010_create_project;
mod m20240301_000011_create_project_duty;
mod m20240301_000012_create_timeline;
mod m20240301_000013_create_timeline_phase;
mod m20240301_000014_create_milestone;
mod m20240301_000015_create_document;
mod m20240301_000016_create_comment;
mod m20240301_000017_create_activity_log;
mod m20240301_000018_create_notification;
mod m20240301_000019_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_tenant::Migration),
            Box::new(m20240301_000002_create_user::Migration),
            Box::new(m20240301_000003_create_user_credentials::Migration),
            Box::new(m20240301_000004_create_role::Migration),
            Box::new(m20240301_000005_create_role_permission::Migration),
            Box::new(m20240301_000006_create_user_role::Migration),
            Box::new(m20240301_000007_create_team::Migration),
            Box::new(m20240301_000008_create_user_team::Migration),
            Box::new(m20240301_000009_create_person::Migration),
            Box::new(m20240301_000010_create_project::Migration),
            Box::new(m20240301_000011_create_project_duty::Migration),
            Box::new(m20240301_000012_create_timeline::Migration),
            Box::new(m20240301_000013_create_timeline_phase::Migration),
            Box::new(m20240301_000014_create_milestone::Migration),
            Box::new(m20240301_000015_create_document::Migration),
            Box::new(m20240301_000016_create_comment::Migration),
            Box::new(m20240301_000017_create_activity_log::Migration),
            Box::new(m20240301_000018_create_notification::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000019_add_indexes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
