use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, person, team, tenant, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled projects accept no duty changes.
    pub fn is_closed(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (NotStarted, Cancelled)
                | (InProgress, OnHold)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (OnHold, InProgress)
                | (OnHold, Cancelled)
                | (Completed, InProgress)
                | (Cancelled, NotStarted)
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub team_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Both dates, when the project is scheduled.
    pub fn date_range(&self) -> Option<(Date, Date)> {
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Team, Manager }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Team => Entity::belongs_to(team::Entity).from(Column::TeamId).to(team::Column::Id).into(),
            Relation::Manager => Entity::belongs_to(person::Entity).from(Column::ManagerId).to(person::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("project name", name, 200)
}

pub fn validate_dates(start: Option<Date>, end: Option<Date>) -> Result<(), errors::ModelError> {
    if let (Some(s), Some(e)) = (start, end) {
        validate::date_range(s, e)?;
    }
    Ok(())
}

pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), errors::ModelError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(errors::ModelError::validation(format!(
            "project cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Live projects of a tenant.
pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id)).filter(Column::DeletedAt.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProjectStatus::*;

    #[test]
    fn project_status_machine() {
        assert!(NotStarted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(InProgress));
        assert!(Cancelled.can_transition_to(NotStarted));
        assert!(OnHold.can_transition_to(OnHold));
        assert!(!NotStarted.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!OnHold.can_transition_to(Completed));
    }

    #[test]
    fn closed_statuses() {
        assert!(Completed.is_closed());
        assert!(Cancelled.is_closed());
        assert!(!OnHold.is_closed());
    }

    #[test]
    fn transition_error_names_both_ends() {
        let err = validate_transition(NotStarted, Completed).unwrap_err().to_string();
        assert!(err.contains("not_started") && err.contains("completed"));
    }

    #[test]
    fn dates_must_be_ordered() {
        let a = Date::from_ymd_opt(2024, 5, 1);
        let b = Date::from_ymd_opt(2024, 4, 1);
        assert!(validate_dates(a, b).is_err());
        assert!(validate_dates(b, a).is_ok());
        assert!(validate_dates(a, None).is_ok());
    }
}
