use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Select, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::notification::{NotificationKind, Target};
use models::project::{self, ProjectStatus};
use models::project_duty::{self, DutyPriority, DutyStatus};
use models::{comment, document, validate};

use super::{activity, lookup, notifications};
use crate::context::{permissions, RequestContext};
use crate::crud::{nullable, ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["title", "status", "priority", "due_date", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateDuty {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<DutyPriority>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<sea_orm::prelude::Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDuty {
    pub title: Option<String>,
    /// Blank clears
    pub description: Option<String>,
    pub priority: Option<DutyPriority>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<sea_orm::prelude::Date>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DutyQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<DutyStatus>,
    pub priority: Option<DutyPriority>,
    pub assignee_id: Option<Uuid>,
    pub title: Option<String>,
    #[serde(default)]
    pub overdue: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeDutyStatus {
    pub status: DutyStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignDuty {
    pub assignee_id: Option<Uuid>,
}

pub struct DutyService {
    db: DatabaseConnection,
}

impl DutyService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    fn filtered(tenant_id: Uuid, query: &DutyQuery) -> Select<project_duty::Entity> {
        let mut select = project_duty::find_in_tenant(tenant_id);
        if let Some(project_id) = query.project_id {
            select = select.filter(project_duty::Column::ProjectId.eq(project_id));
        }
        if let Some(status) = query.status {
            select = select.filter(project_duty::Column::Status.eq(status));
        }
        if let Some(priority) = query.priority {
            select = select.filter(project_duty::Column::Priority.eq(priority));
        }
        if let Some(assignee_id) = query.assignee_id {
            select = select.filter(project_duty::Column::AssigneeId.eq(assignee_id));
        }
        if let Some(t) = query.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(project_duty::Column::Title.contains(t));
        }
        if query.overdue {
            select = select.filter(overdue_condition(Utc::now().date_naive()));
        }
        select
    }

    async fn page(&self, ctx: &RequestContext, query: DutyQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<project_duty::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::desc("created_at"))?;
        let column = match sort.field.as_str() {
            "title" => project_duty::Column::Title,
            "status" => project_duty::Column::Status,
            "priority" => project_duty::Column::Priority,
            "due_date" => project_duty::Column::DueDate,
            _ => project_duty::Column::CreatedAt,
        };
        let select = Self::filtered(ctx.tenant_id, &query);
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }

    async fn notify_assignee(&self, ctx: &RequestContext, duty: &project_duty::Model) {
        let Some(assignee) = duty.assignee_id else { return };
        notifications::notify(
            &self.db,
            ctx,
            assignee,
            NotificationKind::DutyAssigned,
            "Duty assigned",
            &format!("You were assigned to '{}'", duty.title),
            Some(Target { entity_type: "duty", entity_id: duty.id }),
        )
        .await;
    }

    /// Apply the duty status machine. Leaving `todo` starts a project that
    /// has not started yet.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, duty_id = %id, to = input.status.as_str()))]
    pub async fn change_status(&self, ctx: &RequestContext, id: Uuid, input: ChangeDutyStatus) -> Result<project_duty::Model, ServiceError> {
        ctx.require(permissions::DUTIES_WRITE)?;
        let existing = lookup::duty(&self.db, ctx.tenant_id, id).await?;
        let parent = lookup::open_project(&self.db, ctx.tenant_id, existing.project_id).await?;
        let from = existing.status;
        let to = input.status;
        if from == to {
            return Ok(existing);
        }
        project_duty::validate_transition(from, to)?;

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let mut am: project_duty::ActiveModel = existing.into();
        am.status = Set(to);
        if to == DutyStatus::Done {
            am.completed_at = Set(Some(now.into()));
        } else if from == DutyStatus::Done {
            am.completed_at = Set(None);
        }
        am.updated_at = Set(now.into());
        let updated = am.update(&txn).await?;

        let started = from == DutyStatus::Todo && parent.status == ProjectStatus::NotStarted;
        if started {
            let mut p: project::ActiveModel = parent.into();
            p.status = Set(ProjectStatus::InProgress);
            p.updated_at = Set(now.into());
            p.update(&txn).await?;
        }
        txn.commit().await?;

        info!(from = from.as_str(), project_started = started, "duty_status_changed");
        let details = serde_json::json!({ "from": from.as_str(), "to": to.as_str() });
        activity::record(&self.db, ctx, "duty", id, ActivityAction::StatusChanged, Some(details)).await;
        if started {
            let details = serde_json::json!({ "from": "not_started", "to": "in_progress" });
            activity::record(&self.db, ctx, "project", updated.project_id, ActivityAction::StatusChanged, Some(details)).await;
        }
        Ok(updated)
    }

    /// Set or clear the assignee.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, duty_id = %id))]
    pub async fn assign(&self, ctx: &RequestContext, id: Uuid, input: AssignDuty) -> Result<project_duty::Model, ServiceError> {
        ctx.require(permissions::DUTIES_WRITE)?;
        let existing = lookup::duty(&self.db, ctx.tenant_id, id).await?;
        lookup::open_project(&self.db, ctx.tenant_id, existing.project_id).await?;
        if let Some(uid) = input.assignee_id {
            lookup::referenced(lookup::user(&self.db, ctx.tenant_id, uid).await, "assignee_id")?;
        }
        let previous = existing.assignee_id;
        let mut am: project_duty::ActiveModel = existing.into();
        am.assignee_id = Set(input.assignee_id);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;

        info!(assignee_id = ?updated.assignee_id, "duty_assigned");
        let details = serde_json::json!({ "from": previous, "to": updated.assignee_id });
        activity::record(&self.db, ctx, "duty", id, ActivityAction::Assigned, Some(details)).await;
        if updated.assignee_id != previous {
            self.notify_assignee(ctx, &updated).await;
        }
        Ok(updated)
    }
}

/// Due before `today` and neither done nor cancelled.
pub(crate) fn overdue_condition(today: sea_orm::prelude::Date) -> Condition {
    Condition::all()
        .add(project_duty::Column::DueDate.lt(today))
        .add(project_duty::Column::Status.is_not_in([DutyStatus::Done, DutyStatus::Cancelled]))
}

#[async_trait]
impl CrudService for DutyService {
    type Dto = project_duty::Model;
    type CreateInput = CreateDuty;
    type UpdateInput = UpdateDuty;
    type ListQuery = DutyQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %input.project_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateDuty) -> Result<project_duty::Model, ServiceError> {
        ctx.require(permissions::DUTIES_WRITE)?;
        let title = project_duty::validate_title(&input.title)?;
        let description = validate::optional_text("description", input.description.as_deref(), 4000)?;
        let parent = lookup::referenced(lookup::project(&self.db, ctx.tenant_id, input.project_id).await, "project_id")?;
        if parent.status.is_closed() {
            return Err(ServiceError::validation(format!("project is {}", parent.status.as_str())));
        }
        project_duty::validate_due_date(input.due_date, parent.end_date)?;
        if let Some(uid) = input.assignee_id {
            lookup::referenced(lookup::user(&self.db, ctx.tenant_id, uid).await, "assignee_id")?;
        }

        let now = Utc::now();
        let created = project_duty::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            project_id: Set(parent.id),
            title: Set(title),
            description: Set(description),
            status: Set(DutyStatus::Todo),
            priority: Set(input.priority.unwrap_or(DutyPriority::Medium)),
            assignee_id: Set(input.assignee_id),
            due_date: Set(input.due_date),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(duty_id = %created.id, "duty_created");
        activity::record(&self.db, ctx, "duty", created.id, ActivityAction::Created, None).await;
        self.notify_assignee(ctx, &created).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<project_duty::Model, ServiceError> {
        ctx.require(permissions::DUTIES_READ)?;
        lookup::duty(&self.db, ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, duty_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateDuty) -> Result<project_duty::Model, ServiceError> {
        ctx.require(permissions::DUTIES_WRITE)?;
        let existing = lookup::duty(&self.db, ctx.tenant_id, id).await?;
        let parent = lookup::open_project(&self.db, ctx.tenant_id, existing.project_id).await?;
        let due_date = input.due_date.unwrap_or(existing.due_date);
        project_duty::validate_due_date(due_date, parent.end_date)?;

        let mut am: project_duty::ActiveModel = existing.into();
        if let Some(t) = input.title.as_deref() {
            am.title = Set(project_duty::validate_title(t)?);
        }
        if input.description.is_some() {
            am.description = Set(validate::optional_text("description", input.description.as_deref(), 4000)?);
        }
        if let Some(priority) = input.priority {
            am.priority = Set(priority);
        }
        am.due_date = Set(due_date);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("duty_updated");
        activity::record(&self.db, ctx, "duty", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    /// Soft delete. Comments go with the duty; documents stay on the project.
    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, duty_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::DUTIES_WRITE)?;
        let existing = lookup::duty(&self.db, ctx.tenant_id, id).await?;
        let now = Utc::now();
        let txn = self.db.begin().await?;
        comment::Entity::delete_many().filter(comment::Column::DutyId.eq(id)).exec(&txn).await?;
        document::Entity::update_many()
            .col_expr(document::Column::DutyId, Expr::value(Option::<Uuid>::None))
            .filter(document::Column::DutyId.eq(id))
            .exec(&txn)
            .await?;
        let mut am: project_duty::ActiveModel = existing.into();
        am.deleted_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        am.update(&txn).await?;
        txn.commit().await?;
        info!("duty_deleted");
        activity::record(&self.db, ctx, "duty", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: DutyQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<project_duty::Model>, ServiceError> {
        ctx.require(permissions::DUTIES_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for DutyService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: DutyQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<project_duty::Model>, ServiceError> {
        ctx.require(permissions::DUTIES_READ)?;
        lookup::project(&self.db, ctx.tenant_id, parent_id).await?;
        query.project_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_query_flags() {
        let q: DutyQuery = serde_json::from_value(serde_json::json!({ "overdue": true, "status": "todo" })).unwrap();
        assert!(q.overdue);
        assert_eq!(q.status, Some(DutyStatus::Todo));
        let q: DutyQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!q.overdue);
    }

    #[test]
    fn assign_accepts_explicit_null() {
        let a: AssignDuty = serde_json::from_value(serde_json::json!({ "assignee_id": null })).unwrap();
        assert!(a.assignee_id.is_none());
    }
}
