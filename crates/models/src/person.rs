//! Directory people. One table, two kinds: team members and project managers.

use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, team, tenant, user, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    #[sea_orm(string_value = "team_member")]
    TeamMember,
    #[sea_orm(string_value = "project_manager")]
    ProjectManager,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: PersonKind,
    pub full_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, User, Team }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Team => Entity::belongs_to(team::Entity).from(Column::TeamId).to(team::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_full_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("full_name", name, 128)
}

pub fn validate_email(email: Option<&str>) -> Result<Option<String>, errors::ModelError> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(e) => validate::email(e).map(Some),
    }
}

/// Team members belong to exactly one team; project managers to none.
pub fn validate_team_for_kind(kind: PersonKind, team_id: Option<Uuid>) -> Result<(), errors::ModelError> {
    match (kind, team_id) {
        (PersonKind::TeamMember, None) => Err(errors::ModelError::validation("team_member requires team_id")),
        (PersonKind::ProjectManager, Some(_)) => Err(errors::ModelError::validation("project_manager cannot have team_id")),
        _ => Ok(()),
    }
}

pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_team_rules() {
        let t = Some(Uuid::new_v4());
        assert!(validate_team_for_kind(PersonKind::TeamMember, t).is_ok());
        assert!(validate_team_for_kind(PersonKind::TeamMember, None).is_err());
        assert!(validate_team_for_kind(PersonKind::ProjectManager, None).is_ok());
        assert!(validate_team_for_kind(PersonKind::ProjectManager, t).is_err());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(PersonKind::ProjectManager).unwrap();
        assert_eq!(v, "project_manager");
    }
}
