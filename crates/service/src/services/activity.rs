use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use models::activity_log::{self, ActivityAction};

use crate::context::{permissions, RequestContext};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

/// Append an activity entry for a mutation `ctx` just made.
/// Write failures are logged and swallowed; the mutation has already happened.
pub(crate) async fn record<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    entity_type: &str,
    entity_id: Uuid,
    action: ActivityAction,
    details: Option<serde_json::Value>,
) {
    common::metrics::record_mutation(entity_type, action.as_str());
    if let Err(e) = activity_log::append(db, ctx.tenant_id, Some(ctx.user_id), entity_type, entity_id, action, details).await {
        warn!(
            tenant_id = %ctx.tenant_id,
            entity_type,
            entity_id = %entity_id,
            action = action.as_str(),
            error = %e,
            "activity log write failed"
        );
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
}

/// Read side of the activity log.
pub struct ActivityService {
    db: DatabaseConnection,
}

impl ActivityService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Newest first.
    pub async fn list(&self, ctx: &RequestContext, query: ActivityQuery, pagination: Pagination) -> Result<Page<activity_log::Model>, ServiceError> {
        ctx.require(permissions::ACTIVITY_READ)?;
        let mut select = activity_log::find_in_tenant(ctx.tenant_id);
        if let Some(t) = query.entity_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(activity_log::Column::EntityType.eq(t));
        }
        if let Some(id) = query.entity_id {
            select = select.filter(activity_log::Column::EntityId.eq(id));
        }
        if let Some(uid) = query.user_id {
            select = select.filter(activity_log::Column::UserId.eq(uid));
        }
        if let Some(action) = query.action {
            select = select.filter(activity_log::Column::Action.eq(action));
        }
        let select = order_by(select, activity_log::Column::CreatedAt, &SortSpec::desc("created_at"));
        fetch_page(&self.db, select, pagination).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<activity_log::Model, ServiceError> {
        ctx.require(permissions::ACTIVITY_READ)?;
        activity_log::find_in_tenant(ctx.tenant_id)
            .filter(activity_log::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("activity log"))
    }
}
