use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::{milestone, validate};

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{nullable, ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "due_date", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateMilestone {
    pub project_id: Uuid,
    pub timeline_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub due_date: sea_orm::prelude::Date,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMilestone {
    pub name: Option<String>,
    /// Blank clears
    pub description: Option<String>,
    pub due_date: Option<sea_orm::prelude::Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub timeline_id: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MilestoneQuery {
    pub project_id: Option<Uuid>,
    pub timeline_id: Option<Uuid>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteMilestone {
    pub completed: bool,
}

pub struct MilestoneService {
    db: DatabaseConnection,
}

impl MilestoneService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn milestone(&self, tenant_id: Uuid, id: Uuid) -> Result<milestone::Model, ServiceError> {
        milestone::find_in_tenant(tenant_id)
            .filter(milestone::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("milestone"))
    }

    async fn check_schedule(&self, tenant_id: Uuid, project_id: Uuid, timeline_id: Option<Uuid>, due_date: sea_orm::prelude::Date) -> Result<(), ServiceError> {
        let project = lookup::referenced(lookup::project(&self.db, tenant_id, project_id).await, "project_id")?;
        let timeline = match timeline_id {
            Some(tid) => Some(lookup::referenced(lookup::timeline(&self.db, tenant_id, tid).await, "timeline_id")?),
            None => None,
        };
        milestone::validate_schedule(project_id, due_date, timeline.as_ref(), project.date_range())?;
        Ok(())
    }

    async fn page(&self, ctx: &RequestContext, query: MilestoneQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<milestone::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("due_date"))?;
        let mut select: Select<milestone::Entity> = milestone::find_in_tenant(ctx.tenant_id);
        if let Some(project_id) = query.project_id {
            select = select.filter(milestone::Column::ProjectId.eq(project_id));
        }
        if let Some(timeline_id) = query.timeline_id {
            select = select.filter(milestone::Column::TimelineId.eq(timeline_id));
        }
        if let Some(done) = query.is_completed {
            select = select.filter(milestone::Column::IsCompleted.eq(done));
        }
        let column = match sort.field.as_str() {
            "name" => milestone::Column::Name,
            "created_at" => milestone::Column::CreatedAt,
            _ => milestone::Column::DueDate,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }

    /// Mark a milestone done or reopen it.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, milestone_id = %id, completed = input.completed))]
    pub async fn complete(&self, ctx: &RequestContext, id: Uuid, input: CompleteMilestone) -> Result<milestone::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let existing = self.milestone(ctx.tenant_id, id).await?;
        if existing.is_completed == input.completed {
            return Ok(existing);
        }
        let now = Utc::now();
        let mut am: milestone::ActiveModel = existing.into();
        am.is_completed = Set(input.completed);
        am.completed_at = Set(input.completed.then(|| now.into()));
        am.updated_at = Set(now.into());
        let updated = am.update(&self.db).await?;
        info!("milestone_completion_changed");
        let action = if input.completed { ActivityAction::Completed } else { ActivityAction::Updated };
        activity::record(&self.db, ctx, "milestone", id, action, Some(serde_json::json!({ "completed": input.completed }))).await;
        Ok(updated)
    }
}

#[async_trait]
impl CrudService for MilestoneService {
    type Dto = milestone::Model;
    type CreateInput = CreateMilestone;
    type UpdateInput = UpdateMilestone;
    type ListQuery = MilestoneQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %input.project_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateMilestone) -> Result<milestone::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let name = milestone::validate_name(&input.name)?;
        let description = validate::optional_text("description", input.description.as_deref(), 4000)?;
        self.check_schedule(ctx.tenant_id, input.project_id, input.timeline_id, input.due_date).await?;

        let now = Utc::now();
        let created = milestone::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            project_id: Set(input.project_id),
            timeline_id: Set(input.timeline_id),
            name: Set(name),
            description: Set(description),
            due_date: Set(input.due_date),
            is_completed: Set(false),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(milestone_id = %created.id, "milestone_created");
        activity::record(&self.db, ctx, "milestone", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<milestone::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        self.milestone(ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, milestone_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateMilestone) -> Result<milestone::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let existing = self.milestone(ctx.tenant_id, id).await?;
        let timeline_id = input.timeline_id.unwrap_or(existing.timeline_id);
        let due_date = input.due_date.unwrap_or(existing.due_date);
        if timeline_id != existing.timeline_id || due_date != existing.due_date {
            self.check_schedule(ctx.tenant_id, existing.project_id, timeline_id, due_date).await?;
        }

        let mut am: milestone::ActiveModel = existing.into();
        if let Some(n) = input.name.as_deref() {
            am.name = Set(milestone::validate_name(n)?);
        }
        if input.description.is_some() {
            am.description = Set(validate::optional_text("description", input.description.as_deref(), 4000)?);
        }
        am.timeline_id = Set(timeline_id);
        am.due_date = Set(due_date);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("milestone_updated");
        activity::record(&self.db, ctx, "milestone", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, milestone_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        self.milestone(ctx.tenant_id, id).await?;
        milestone::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("milestone_deleted");
        activity::record(&self.db, ctx, "milestone", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: MilestoneQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<milestone::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for MilestoneService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: MilestoneQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<milestone::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        lookup::project(&self.db, ctx.tenant_id, parent_id).await?;
        query.project_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}
