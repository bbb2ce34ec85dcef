use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::timeline_phase;

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["sort_order", "start_date", "name"];

#[derive(Debug, Deserialize)]
pub struct CreatePhase {
    pub timeline_id: Uuid,
    pub name: String,
    pub start_date: sea_orm::prelude::Date,
    pub end_date: sea_orm::prelude::Date,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePhase {
    pub name: Option<String>,
    pub start_date: Option<sea_orm::prelude::Date>,
    pub end_date: Option<sea_orm::prelude::Date>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhaseQuery {
    pub timeline_id: Option<Uuid>,
}

pub struct PhaseService {
    db: DatabaseConnection,
}

impl PhaseService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn phase(&self, tenant_id: Uuid, id: Uuid) -> Result<timeline_phase::Model, ServiceError> {
        timeline_phase::find_in_tenant(tenant_id)
            .filter(timeline_phase::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("phase"))
    }

    /// Other phases of the same timeline.
    async fn siblings(&self, timeline_id: Uuid, except: Option<Uuid>) -> Result<Vec<timeline_phase::Model>, ServiceError> {
        let mut select = timeline_phase::Entity::find().filter(timeline_phase::Column::TimelineId.eq(timeline_id));
        if let Some(id) = except {
            select = select.filter(timeline_phase::Column::Id.ne(id));
        }
        Ok(select.all(&self.db).await?)
    }

    async fn page(&self, ctx: &RequestContext, query: PhaseQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<timeline_phase::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("sort_order"))?;
        let mut select: Select<timeline_phase::Entity> = timeline_phase::find_in_tenant(ctx.tenant_id);
        if let Some(timeline_id) = query.timeline_id {
            select = select.filter(timeline_phase::Column::TimelineId.eq(timeline_id));
        }
        let column = match sort.field.as_str() {
            "start_date" => timeline_phase::Column::StartDate,
            "name" => timeline_phase::Column::Name,
            _ => timeline_phase::Column::SortOrder,
        };
        let select = order_by(select, column, &sort).order_by_asc(timeline_phase::Column::StartDate);
        fetch_page(&self.db, select, pagination).await
    }
}

#[async_trait]
impl CrudService for PhaseService {
    type Dto = timeline_phase::Model;
    type CreateInput = CreatePhase;
    type UpdateInput = UpdatePhase;
    type ListQuery = PhaseQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, timeline_id = %input.timeline_id))]
    async fn create(&self, ctx: &RequestContext, input: CreatePhase) -> Result<timeline_phase::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let name = timeline_phase::validate_name(&input.name)?;
        let parent = lookup::referenced(lookup::timeline(&self.db, ctx.tenant_id, input.timeline_id).await, "timeline_id")?;
        let siblings = self.siblings(parent.id, None).await?;
        timeline_phase::validate_placement((input.start_date, input.end_date), parent.range(), &siblings)?;
        let sort_order = match input.sort_order {
            Some(o) => timeline_phase::validate_sort_order(o)?,
            None => siblings.iter().map(|p| p.sort_order + 1).max().unwrap_or(0),
        };

        let now = Utc::now();
        let created = timeline_phase::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            timeline_id: Set(parent.id),
            name: Set(name),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            sort_order: Set(sort_order),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(phase_id = %created.id, sort_order, "phase_created");
        activity::record(&self.db, ctx, "phase", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<timeline_phase::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        self.phase(ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, phase_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdatePhase) -> Result<timeline_phase::Model, ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        let existing = self.phase(ctx.tenant_id, id).await?;
        let range = (
            input.start_date.unwrap_or(existing.start_date),
            input.end_date.unwrap_or(existing.end_date),
        );
        if range != existing.range() {
            let parent = lookup::timeline(&self.db, ctx.tenant_id, existing.timeline_id).await?;
            let siblings = self.siblings(parent.id, Some(id)).await?;
            timeline_phase::validate_placement(range, parent.range(), &siblings)?;
        }

        let mut am: timeline_phase::ActiveModel = existing.into();
        if let Some(n) = input.name.as_deref() {
            am.name = Set(timeline_phase::validate_name(n)?);
        }
        if let Some(o) = input.sort_order {
            am.sort_order = Set(timeline_phase::validate_sort_order(o)?);
        }
        am.start_date = Set(range.0);
        am.end_date = Set(range.1);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("phase_updated");
        activity::record(&self.db, ctx, "phase", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, phase_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::TIMELINES_WRITE)?;
        self.phase(ctx.tenant_id, id).await?;
        timeline_phase::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("phase_deleted");
        activity::record(&self.db, ctx, "phase", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: PhaseQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<timeline_phase::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for PhaseService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: PhaseQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<timeline_phase::Model>, ServiceError> {
        ctx.require(permissions::TIMELINES_READ)?;
        lookup::timeline(&self.db, ctx.tenant_id, parent_id).await?;
        query.timeline_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}
