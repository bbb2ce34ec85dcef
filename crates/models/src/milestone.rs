use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project, tenant, timeline, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milestone")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub timeline_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Date,
    pub is_completed: bool,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Project, Timeline }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Project => Entity::belongs_to(project::Entity).from(Column::ProjectId).to(project::Column::Id).into(),
            Relation::Timeline => Entity::belongs_to(timeline::Entity).from(Column::TimelineId).to(timeline::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("milestone name", name, 128)
}

/// A linked timeline must belong to the milestone's project and contain the due date.
/// Without a timeline the due date must fit the project schedule, if any.
pub fn validate_schedule(
    project_id: Uuid,
    due_date: Date,
    timeline: Option<&timeline::Model>,
    project_range: Option<(Date, Date)>,
) -> Result<(), errors::ModelError> {
    match timeline {
        Some(t) => {
            if t.project_id != project_id {
                return Err(errors::ModelError::validation("timeline belongs to a different project"));
            }
            if !t.contains(due_date) {
                return Err(errors::ModelError::validation("due_date must lie within the timeline dates"));
            }
        }
        None => {
            if let Some(outer) = project_range {
                if !validate::within((due_date, due_date), outer) {
                    return Err(errors::ModelError::validation("due_date must lie within the project dates"));
                }
            }
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

    fn tl(project_id: Uuid) -> timeline::Model {
        let now = chrono::Utc::now().into();
        timeline::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            project_id,
            name: "q1".into(),
            start_date: d(1, 1),
            end_date: d(3, 31),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn milestone_in_timeline() {
        let pid = Uuid::new_v4();
        let t = tl(pid);
        assert!(validate_schedule(pid, d(2, 1), Some(&t), None).is_ok());
        assert!(validate_schedule(pid, d(4, 1), Some(&t), None).is_err());
        assert!(validate_schedule(Uuid::new_v4(), d(2, 1), Some(&t), None).is_err());
    }

    #[test]
    fn milestone_in_project_without_timeline() {
        let pid = Uuid::new_v4();
        assert!(validate_schedule(pid, d(6, 1), None, Some((d(1, 1), d(6, 30)))).is_ok());
        assert!(validate_schedule(pid, d(7, 1), None, Some((d(1, 1), d(6, 30)))).is_err());
        assert!(validate_schedule(pid, d(7, 1), None, None).is_ok());
    }
}
