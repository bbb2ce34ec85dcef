use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project, tenant, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn range(&self) -> (Date, Date) { (self.start_date, self.end_date) }

    pub fn contains(&self, day: Date) -> bool { self.start_date <= day && day <= self.end_date }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Project }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Project => Entity::belongs_to(project::Entity).from(Column::ProjectId).to(project::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("timeline name", name, 128)
}

/// Ordered range that fits in the project's schedule, when it has one.
pub fn validate_range(start: Date, end: Date, project_range: Option<(Date, Date)>) -> Result<(), errors::ModelError> {
    validate::date_range(start, end)?;
    if let Some(outer) = project_range {
        if !validate::within((start, end), outer) {
            return Err(errors::ModelError::validation("timeline must lie within the project dates"));
        }
    }
    Ok(())
}

pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> Date { Date::from_ymd_opt(2024, m, day).unwrap() }

    #[test]
    fn timeline_inside_project() {
        let project = Some((d(1, 1), d(12, 31)));
        assert!(validate_range(d(2, 1), d(3, 1), project).is_ok());
        assert!(validate_range(d(3, 1), d(2, 1), project).is_err());
        assert!(validate_range(d(2, 1), d(3, 1), Some((d(2, 15), d(12, 31)))).is_err());
        assert!(validate_range(d(2, 1), d(3, 1), None).is_ok());
    }
}
