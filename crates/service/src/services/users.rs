use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::{user, user_role};

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "email", "created_at"];

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// Substring of name or email
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoles {
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    pub roles: Vec<String>,
}

/// Tenant user administration; every operation needs `users.manage`.
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn view(&self, u: user::Model) -> Result<UserView, ServiceError> {
        let roles = user_role::roles_of(&self.db, u.id).await?.into_iter().map(|r| r.name).collect();
        Ok(UserView { user: u, roles })
    }

    pub async fn list(&self, ctx: &RequestContext, query: UserQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<user::Model>, ServiceError> {
        ctx.require(permissions::USERS_MANAGE)?;
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("name"))?;
        let mut select = user::find_in_tenant(ctx.tenant_id);
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(user::Column::Name.contains(q))
                    .add(user::Column::Email.contains(q.to_ascii_lowercase())),
            );
        }
        if let Some(status) = query.status.as_deref() {
            select = select.filter(user::Column::Status.eq(user::validate_status(status)?));
        }
        let column = match sort.field.as_str() {
            "email" => user::Column::Email,
            "created_at" => user::Column::CreatedAt,
            _ => user::Column::Name,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<UserView, ServiceError> {
        ctx.require(permissions::USERS_MANAGE)?;
        let u = lookup::user(&self.db, ctx.tenant_id, id).await?;
        self.view(u).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, user_id = %id))]
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateUser) -> Result<UserView, ServiceError> {
        ctx.require(permissions::USERS_MANAGE)?;
        let existing = lookup::user(&self.db, ctx.tenant_id, id).await?;
        let mut am: user::ActiveModel = existing.into();
        if let Some(name) = input.name.as_deref() {
            am.name = Set(user::validate_name(name)?);
        }
        if let Some(status) = input.status.as_deref() {
            let status = user::validate_status(status)?;
            if id == ctx.user_id && status == user::STATUS_DISABLED {
                return Err(ServiceError::validation("cannot disable yourself"));
            }
            am.status = Set(status);
        }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!(status = %updated.status, "user_updated");
        activity::record(&self.db, ctx, "user", id, ActivityAction::Updated, None).await;
        self.view(updated).await
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, user_id = %id))]
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::USERS_MANAGE)?;
        if id == ctx.user_id {
            return Err(ServiceError::validation("cannot delete yourself"));
        }
        let existing = lookup::user(&self.db, ctx.tenant_id, id).await?;
        user::soft_delete(&self.db, existing.id).await?;
        info!("user_deleted");
        activity::record(&self.db, ctx, "user", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    /// Replace the roles of a user; every role must belong to the tenant.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, user_id = %id))]
    pub async fn set_roles(&self, ctx: &RequestContext, id: Uuid, input: SetRoles) -> Result<UserView, ServiceError> {
        ctx.require(permissions::USERS_MANAGE)?;
        let u = lookup::user(&self.db, ctx.tenant_id, id).await?;
        let mut role_ids = input.role_ids;
        role_ids.sort();
        role_ids.dedup();
        for rid in &role_ids {
            lookup::referenced(lookup::role(&self.db, ctx.tenant_id, *rid).await, "role_ids")?;
        }
        let txn = self.db.begin().await?;
        user_role::replace_for_user(&txn, u.id, &role_ids).await?;
        txn.commit().await?;
        info!(roles = role_ids.len(), "user_roles_replaced");
        activity::record(&self.db, ctx, "user", id, ActivityAction::Updated, Some(serde_json::json!({ "role_ids": role_ids }))).await;
        self.view(u).await
    }
}
