use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::comment;
use models::notification::{NotificationKind, Target};

use super::{activity, lookup, notifications};
use crate::context::{permissions, RequestContext};
use crate::crud::{ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub duty_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub duty_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn comment(&self, tenant_id: Uuid, id: Uuid) -> Result<comment::Model, ServiceError> {
        comment::find_in_tenant(tenant_id)
            .filter(comment::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("comment"))
    }

    fn ensure_author(ctx: &RequestContext, c: &comment::Model) -> Result<(), ServiceError> {
        if c.author_id == ctx.user_id || ctx.has(permissions::COMMENTS_MANAGE) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("only the author may change this comment".into()))
        }
    }

    async fn page(&self, ctx: &RequestContext, query: CommentQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<comment::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("created_at"))?;
        let mut select: Select<comment::Entity> = comment::find_in_tenant(ctx.tenant_id);
        if let Some(duty_id) = query.duty_id {
            select = select.filter(comment::Column::DutyId.eq(duty_id));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(comment::Column::AuthorId.eq(author_id));
        }
        fetch_page(&self.db, order_by(select, comment::Column::CreatedAt, &sort), pagination).await
    }
}

#[async_trait]
impl CrudService for CommentService {
    type Dto = comment::Model;
    type CreateInput = CreateComment;
    type UpdateInput = UpdateComment;
    type ListQuery = CommentQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, duty_id = %input.duty_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateComment) -> Result<comment::Model, ServiceError> {
        ctx.require(permissions::COMMENTS_WRITE)?;
        let content = comment::validate_content(&input.content)?;
        let duty = lookup::referenced(lookup::duty(&self.db, ctx.tenant_id, input.duty_id).await, "duty_id")?;

        let now = Utc::now();
        let created = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            duty_id: Set(duty.id),
            author_id: Set(ctx.user_id),
            content: Set(content),
            edited: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(comment_id = %created.id, "comment_created");
        activity::record(&self.db, ctx, "comment", created.id, ActivityAction::Created, None).await;
        if let Some(assignee) = duty.assignee_id {
            notifications::notify(
                &self.db,
                ctx,
                assignee,
                NotificationKind::CommentAdded,
                "New comment",
                &format!("New comment on '{}'", duty.title),
                Some(Target { entity_type: "duty", entity_id: duty.id }),
            )
            .await;
        }
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<comment::Model, ServiceError> {
        ctx.require(permissions::COMMENTS_READ)?;
        self.comment(ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, comment_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateComment) -> Result<comment::Model, ServiceError> {
        ctx.require(permissions::COMMENTS_WRITE)?;
        let existing = self.comment(ctx.tenant_id, id).await?;
        Self::ensure_author(ctx, &existing)?;
        let content = comment::validate_content(&input.content)?;
        if content == existing.content {
            return Ok(existing);
        }
        let mut am: comment::ActiveModel = existing.into();
        am.content = Set(content);
        am.edited = Set(true);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("comment_updated");
        activity::record(&self.db, ctx, "comment", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, comment_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::COMMENTS_WRITE)?;
        let existing = self.comment(ctx.tenant_id, id).await?;
        Self::ensure_author(ctx, &existing)?;
        comment::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("comment_deleted");
        activity::record(&self.db, ctx, "comment", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: CommentQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<comment::Model>, ServiceError> {
        ctx.require(permissions::COMMENTS_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for CommentService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: CommentQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<comment::Model>, ServiceError> {
        ctx.require(permissions::COMMENTS_READ)?;
        lookup::duty(&self.db, ctx.tenant_id, parent_id).await?;
        query.duty_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}
