//! Per-user inbox. Every operation is scoped to the caller's own rows.

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::notification::{self, NotificationKind, Target};

use crate::context::RequestContext;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

/// Deliver a notification to `recipient` unless it is the actor.
/// Delivery failures are logged and swallowed.
pub(crate) async fn notify<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    recipient: Uuid,
    kind: NotificationKind,
    title: &str,
    message: &str,
    target: Option<Target<'_>>,
) {
    if recipient == ctx.user_id {
        return;
    }
    if let Err(e) = notification::create(db, ctx.tenant_id, recipient, kind, title, message, target).await {
        warn!(tenant_id = %ctx.tenant_id, recipient = %recipient, error = %e, "notification delivery failed");
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: u64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn own(&self, ctx: &RequestContext, id: Uuid) -> Result<notification::Model, ServiceError> {
        notification::find_for_user(ctx.tenant_id, ctx.user_id)
            .filter(notification::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("notification"))
    }

    /// Newest first.
    pub async fn list(&self, ctx: &RequestContext, query: NotificationQuery, pagination: Pagination) -> Result<Page<notification::Model>, ServiceError> {
        let mut select = notification::find_for_user(ctx.tenant_id, ctx.user_id);
        if query.unread_only {
            select = select.filter(notification::Column::IsRead.eq(false));
        }
        let select = order_by(select, notification::Column::CreatedAt, &SortSpec::desc("created_at"));
        fetch_page(&self.db, select, pagination).await
    }

    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<UnreadCount, ServiceError> {
        let unread = notification::find_for_user(ctx.tenant_id, ctx.user_id)
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        Ok(UnreadCount { unread })
    }

    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> Result<notification::Model, ServiceError> {
        let n = self.own(ctx, id).await?;
        if n.is_read {
            return Ok(n);
        }
        let mut am: notification::ActiveModel = n.into();
        am.is_read = Set(true);
        am.read_at = Set(Some(Utc::now().into()));
        Ok(am.update(&self.db).await?)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, user_id = %ctx.user_id))]
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<MarkedRead, ServiceError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let res = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(now))
            .filter(notification::Column::TenantId.eq(ctx.tenant_id))
            .filter(notification::Column::UserId.eq(ctx.user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        info!(updated = res.rows_affected, "notifications_marked_read");
        Ok(MarkedRead { updated: res.rows_affected })
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        let n = self.own(ctx, id).await?;
        notification::Entity::delete_by_id(n.id).exec(&self.db).await?;
        Ok(())
    }
}
