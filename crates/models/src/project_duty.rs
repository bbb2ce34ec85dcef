use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project, tenant, user, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    #[sea_orm(string_value = "todo")]
    Todo,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "in_review")]
    InReview,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DutyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DutyStatus::Todo => "todo",
            DutyStatus::InProgress => "in_progress",
            DutyStatus::InReview => "in_review",
            DutyStatus::Done => "done",
            DutyStatus::Cancelled => "cancelled",
        }
    }

    /// Done or cancelled.
    pub fn is_finished(self) -> bool {
        matches!(self, DutyStatus::Done | DutyStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: DutyStatus) -> bool {
        use DutyStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Todo, InProgress)
                | (Todo, Cancelled)
                | (InProgress, Todo)
                | (InProgress, InReview)
                | (InProgress, Done)
                | (InProgress, Cancelled)
                | (InReview, InProgress)
                | (InReview, Done)
                | (InReview, Cancelled)
                | (Done, InProgress)
                | (Cancelled, Todo)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DutyPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_duty")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: DutyStatus,
    pub priority: DutyPriority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<Date>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    pub fn is_overdue(&self, today: Date) -> bool {
        !self.status.is_finished() && self.due_date.is_some_and(|d| d < today)
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Project, Assignee }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Project => Entity::belongs_to(project::Entity).from(Column::ProjectId).to(project::Column::Id).into(),
            Relation::Assignee => Entity::belongs_to(user::Entity).from(Column::AssigneeId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<String, errors::ModelError> {
    validate::required_text("title", title, 200)
}

pub fn validate_transition(from: DutyStatus, to: DutyStatus) -> Result<(), errors::ModelError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(errors::ModelError::validation(format!(
            "duty cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// A due date may not fall after the end of its project.
pub fn validate_due_date(due: Option<Date>, project_end: Option<Date>) -> Result<(), errors::ModelError> {
    match (due, project_end) {
        (Some(d), Some(end)) if d > end => Err(errors::ModelError::validation("due_date is after the project end_date")),
        _ => Ok(()),
    }
}

/// Live duties of a tenant.
pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id)).filter(Column::DeletedAt.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use DutyStatus::*;

    #[test]
    fn duty_status_machine() {
        assert!(Todo.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Done));
        assert!(InReview.can_transition_to(InProgress));
        assert!(Done.can_transition_to(InProgress));
        assert!(Cancelled.can_transition_to(Todo));
        assert!(Done.can_transition_to(Done));
        assert!(!Todo.can_transition_to(Done));
        assert!(!Todo.can_transition_to(InReview));
        assert!(!Done.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(InProgress));
    }

    #[test]
    fn due_date_inside_project() {
        let end = Date::from_ymd_opt(2024, 6, 30);
        assert!(validate_due_date(Date::from_ymd_opt(2024, 6, 30), end).is_ok());
        assert!(validate_due_date(Date::from_ymd_opt(2024, 7, 1), end).is_err());
        assert!(validate_due_date(Date::from_ymd_opt(2030, 1, 1), None).is_ok());
    }

    #[test]
    fn overdue_ignores_finished_duties() {
        let today = Date::from_ymd_opt(2024, 6, 1).unwrap();
        let now = chrono::Utc::now().into();
        let mut m = Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            status: Todo,
            priority: DutyPriority::Medium,
            assignee_id: None,
            due_date: Date::from_ymd_opt(2024, 5, 31),
            completed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert!(m.is_overdue(today));
        m.status = Done;
        assert!(!m.is_overdue(today));
        m.status = InProgress;
        m.due_date = Some(today);
        assert!(!m.is_overdue(today));
    }
}
