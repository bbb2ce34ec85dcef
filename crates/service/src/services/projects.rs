use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    prelude::Date, sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::person::PersonKind;
use models::project::{self, ProjectStatus};
use models::{comment, document, milestone, project_duty, timeline, validate};

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{nullable, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "status", "start_date", "end_date", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub team_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub start_date: Option<sea_orm::prelude::Date>,
    pub end_date: Option<sea_orm::prelude::Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    /// Blank clears
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub team_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manager_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<sea_orm::prelude::Date>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<sea_orm::prelude::Date>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
    pub team_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeProjectStatus {
    pub status: ProjectStatus,
}

pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn check_links(&self, tenant_id: Uuid, team_id: Option<Uuid>, manager_id: Option<Uuid>) -> Result<(), ServiceError> {
        if let Some(tid) = team_id {
            lookup::referenced(lookup::team(&self.db, tenant_id, tid).await, "team_id")?;
        }
        if let Some(mid) = manager_id {
            let manager = lookup::referenced(lookup::person(&self.db, tenant_id, mid).await, "manager_id")?;
            if manager.kind != PersonKind::ProjectManager {
                return Err(ServiceError::validation("manager_id must refer to a project_manager"));
            }
        }
        Ok(())
    }

    /// Timelines, duty due dates and unlinked milestones must stay inside a
    /// rescheduled project.
    async fn check_children_fit(&self, tenant_id: Uuid, project_id: Uuid, start: Option<Date>, end: Option<Date>) -> Result<(), ServiceError> {
        if let Some(end) = end {
            let late = project_duty::find_in_tenant(tenant_id)
                .filter(project_duty::Column::ProjectId.eq(project_id))
                .filter(project_duty::Column::DueDate.gt(end))
                .count(&self.db)
                .await?;
            if late > 0 {
                return Err(ServiceError::validation(format!("{late} duty(ies) are due after the new end date")));
            }
        }
        let Some(range) = start.zip(end) else { return Ok(()) };
        let timelines = timeline::find_in_tenant(tenant_id)
            .filter(timeline::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await?;
        if let Some(t) = timelines.iter().find(|t| !validate::within(t.range(), range)) {
            return Err(ServiceError::validation(format!("timeline '{}' would fall outside the project dates", t.name)));
        }
        let stray = milestone::find_in_tenant(tenant_id)
            .filter(milestone::Column::ProjectId.eq(project_id))
            .filter(milestone::Column::TimelineId.is_null())
            .filter(
                Condition::any()
                    .add(milestone::Column::DueDate.lt(range.0))
                    .add(milestone::Column::DueDate.gt(range.1)),
            )
            .count(&self.db)
            .await?;
        if stray > 0 {
            return Err(ServiceError::validation(format!("{stray} milestone(s) would fall outside the project dates")));
        }
        Ok(())
    }

    /// Apply the project status machine.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %id, to = input.status.as_str()))]
    pub async fn change_status(&self, ctx: &RequestContext, id: Uuid, input: ChangeProjectStatus) -> Result<project::Model, ServiceError> {
        ctx.require(permissions::PROJECTS_WRITE)?;
        let existing = lookup::project(&self.db, ctx.tenant_id, id).await?;
        let from = existing.status;
        let to = input.status;
        if from == to {
            return Ok(existing);
        }
        project::validate_transition(from, to)?;
        if to == ProjectStatus::Completed {
            let open = project_duty::find_in_tenant(ctx.tenant_id)
                .filter(project_duty::Column::ProjectId.eq(id))
                .filter(project_duty::Column::Status.is_not_in([project_duty::DutyStatus::Done, project_duty::DutyStatus::Cancelled]))
                .count(&self.db)
                .await?;
            if open > 0 {
                return Err(ServiceError::validation(format!("{open} duty(ies) are still open")));
            }
        }
        let mut am: project::ActiveModel = existing.into();
        am.status = Set(to);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!(from = from.as_str(), "project_status_changed");
        let details = serde_json::json!({ "from": from.as_str(), "to": to.as_str() });
        activity::record(&self.db, ctx, "project", id, ActivityAction::StatusChanged, Some(details)).await;
        Ok(updated)
    }
}

#[async_trait]
impl CrudService for ProjectService {
    type Dto = project::Model;
    type CreateInput = CreateProject;
    type UpdateInput = UpdateProject;
    type ListQuery = ProjectQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateProject) -> Result<project::Model, ServiceError> {
        ctx.require(permissions::PROJECTS_WRITE)?;
        let name = project::validate_name(&input.name)?;
        let description = validate::optional_text("description", input.description.as_deref(), 4000)?;
        project::validate_dates(input.start_date, input.end_date)?;
        self.check_links(ctx.tenant_id, input.team_id, input.manager_id).await?;

        let now = Utc::now();
        let created = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            name: Set(name),
            description: Set(description),
            status: Set(ProjectStatus::NotStarted),
            team_id: Set(input.team_id),
            manager_id: Set(input.manager_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(project_id = %created.id, "project_created");
        activity::record(&self.db, ctx, "project", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<project::Model, ServiceError> {
        ctx.require(permissions::PROJECTS_READ)?;
        lookup::project(&self.db, ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateProject) -> Result<project::Model, ServiceError> {
        ctx.require(permissions::PROJECTS_WRITE)?;
        let existing = lookup::project(&self.db, ctx.tenant_id, id).await?;
        let team_id = input.team_id.unwrap_or(existing.team_id);
        let manager_id = input.manager_id.unwrap_or(existing.manager_id);
        let start_date = input.start_date.unwrap_or(existing.start_date);
        let end_date = input.end_date.unwrap_or(existing.end_date);
        project::validate_dates(start_date, end_date)?;
        self.check_links(ctx.tenant_id, team_id, manager_id).await?;
        if start_date != existing.start_date || end_date != existing.end_date {
            self.check_children_fit(ctx.tenant_id, id, start_date, end_date).await?;
        }

        let mut am: project::ActiveModel = existing.into();
        if let Some(n) = input.name.as_deref() {
            am.name = Set(project::validate_name(n)?);
        }
        if input.description.is_some() {
            am.description = Set(validate::optional_text("description", input.description.as_deref(), 4000)?);
        }
        am.team_id = Set(team_id);
        am.manager_id = Set(manager_id);
        am.start_date = Set(start_date);
        am.end_date = Set(end_date);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("project_updated");
        activity::record(&self.db, ctx, "project", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    /// Soft-deletes the project with its duties. Schedule rows, documents
    /// and duty comments are removed outright.
    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, project_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::PROJECTS_WRITE)?;
        let existing = lookup::project(&self.db, ctx.tenant_id, id).await?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        let txn = self.db.begin().await?;
        let duty_ids: Vec<Uuid> = project_duty::Entity::find()
            .select_only()
            .column(project_duty::Column::Id)
            .filter(project_duty::Column::ProjectId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        comment::Entity::delete_many().filter(comment::Column::DutyId.is_in(duty_ids)).exec(&txn).await?;
        document::Entity::delete_many().filter(document::Column::ProjectId.eq(id)).exec(&txn).await?;
        milestone::Entity::delete_many().filter(milestone::Column::ProjectId.eq(id)).exec(&txn).await?;
        // phases go with their timeline (FK cascade)
        timeline::Entity::delete_many().filter(timeline::Column::ProjectId.eq(id)).exec(&txn).await?;
        let duties = project_duty::Entity::update_many()
            .col_expr(project_duty::Column::DeletedAt, Expr::value(now))
            .col_expr(project_duty::Column::UpdatedAt, Expr::value(now))
            .filter(project_duty::Column::ProjectId.eq(id))
            .filter(project_duty::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;
        let mut am: project::ActiveModel = existing.into();
        am.deleted_at = Set(Some(now));
        am.updated_at = Set(now);
        am.update(&txn).await?;
        txn.commit().await?;

        info!(duties = duties.rows_affected, "project_deleted");
        activity::record(&self.db, ctx, "project", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: ProjectQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<project::Model>, ServiceError> {
        ctx.require(permissions::PROJECTS_READ)?;
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::desc("created_at"))?;
        let mut select = project::find_in_tenant(ctx.tenant_id);
        if let Some(status) = query.status {
            select = select.filter(project::Column::Status.eq(status));
        }
        if let Some(team_id) = query.team_id {
            select = select.filter(project::Column::TeamId.eq(team_id));
        }
        if let Some(manager_id) = query.manager_id {
            select = select.filter(project::Column::ManagerId.eq(manager_id));
        }
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(project::Column::Name.contains(n));
        }
        let column = match sort.field.as_str() {
            "name" => project::Column::Name,
            "status" => project::Column::Status,
            "start_date" => project::Column::StartDate,
            "end_date" => project::Column::EndDate,
            _ => project::Column::CreatedAt,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }
}
