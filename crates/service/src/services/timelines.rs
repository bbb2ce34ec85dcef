use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::{milestone, timeline, timeline_phase, validate};

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "start_date", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateTimeline {
    pub project_id: Uuid,
    pub name: String,
    pub start_date: sea_orm::prelude::Date,
    pub end_date: sea_orm::prelude::Date,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimeline {
    pub name: Option<String>,
    pub start_date: Option<sea_orm::prelude::Date>,
    pub end_date: Option<sea_orm::prelude::Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
}

pub struct TimelineService {
    db: DatabaseConnection,
}

impl TimelineService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    fn filtered(tenant_id: Uuid, query: &TimelineQuery) -> Select<timeline::Entity> {
        let mut select = timeline::find_in_tenant(tenant_id);
        if let Some(project_id) = query.project_id {
            select = select.filter(timeline::Column::ProjectId.eq(project_id));
        }
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(timeline::Column::Name.contains(n));
        }
        select
    }

    async fn page(&self, ctx: &RequestContext, query: TimelineQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<timeline::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("start_date"))?;
        let column = match sort.field.as_str() {
            "name" => timeline::Column::Name,
            "created_at" => timeline::Column::CreatedAt,
            _ => timeline::Column::StartDate,
        };
        let select = Self::filtered(ctx.tenant_id, &query);
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }

    /// Phases and linked milestones must still fit after a reschedule.
    async fn check_children_fit(&self, id: Uuid, range: (sea_orm::prelude::Date, sea_orm::prelude::Date)) -> Result<(), ServiceError> {
        let phases = timeline_phase::Entity::find()
            .filter(timeline_phase::Column::TimelineId.eq(id))
            .all(&self.db)
            .await?;
        if let Some(p) = phases.iter().find(|p| !validate::within(p.range(), range)) {
            return Err(ServiceError::validation(format!("phase '{}' would fall outside the timeline", p.name)));
        }
        let milestones = milestone::Entity::find()
            .filter(milestone::Column::TimelineId.eq(id))
            .all(&self.db)
            .await?;
        if let Some(m) = milestones.iter().find(|m| !validate::within((m.due_date, m.due_date), range)) {
            return Err(ServiceError::validation(format!("milestone '{}' would fall outside the timeline", m.name)));
        }
        Ok(())
    }
}

#[async_trait]
impl CrudService for TimelineService {
    type Dto = timeline::Model;
    type CreateInput = CreateTimeline;
    type UpdateInput = UpdateTimeline;
    type ListQuery = TimelineQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %input.project_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateTimeline) -> Result<timeline::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let name = timeline::validate_name(&input.name)?;
        let parent = lookup::referenced(lookup::project(&self.db, ctx.tenant_id, input.project_id).await, "project_id")?;
        timeline::validate_range(input.start_date, input.end_date, parent.date_range())?;

        let now = Utc::now();
        let created = timeline::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            project_id: Set(parent.id),
            name: Set(name),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(timeline_id = %created.id, "timeline_created");
        activity::record(&self.db, ctx, "timeline", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<timeline::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        lookup::timeline(&self.db, ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, timeline_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateTimeline) -> Result<timeline::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let existing = lookup::timeline(&self.db, ctx.tenant_id, id).await?;
        let start = input.start_date.unwrap_or(existing.start_date);
        let end = input.end_date.unwrap_or(existing.end_date);
        if (start, end) != existing.range() {
            let parent = lookup::project(&self.db, ctx.tenant_id, existing.project_id).await?;
            timeline::validate_range(start, end, parent.date_range())?;
            self.check_children_fit(id, (start, end)).await?;
        }

        let mut am: timeline::ActiveModel = existing.into();
        if let Some(n) = input.name.as_deref() {
            am.name = Set(timeline::validate_name(n)?);
        }
        am.start_date = Set(start);
        am.end_date = Set(end);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("timeline_updated");
        activity::record(&self.db, ctx, "timeline", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    /// Phases go with the timeline; milestones are unlinked by the schema.
    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, timeline_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        lookup::timeline(&self.db, ctx.tenant_id, id).await?;
        timeline::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("timeline_deleted");
        activity::record(&self.db, ctx, "timeline", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: TimelineQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<timeline::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for TimelineService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: TimelineQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<timeline::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        lookup::project(&self.db, ctx.tenant_id, parent_id).await?;
        query.project_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}
