use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::{role, role_permission};

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRole {
    pub display_name: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleView {
    #[serde(flatten)]
    pub role: role::Model,
    pub permissions: Vec<String>,
}

/// Sorted, deduplicated, and every entry a known permission.
pub fn normalize_permissions(perms: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut out: Vec<String> = perms.into_iter().map(|p| p.trim().to_string()).collect();
    if let Some(bad) = out.iter().find(|p| !permissions::is_known(p)) {
        return Err(ServiceError::validation(format!("unknown permission '{bad}'")));
    }
    out.sort();
    out.dedup();
    Ok(out)
}

pub struct RoleService {
    db: DatabaseConnection,
}

impl RoleService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    pub fn known_permissions(&self) -> &'static [&'static str] { permissions::ALL }

    async fn view(&self, r: role::Model) -> Result<RoleView, ServiceError> {
        let permissions = role_permission::list_for_roles(&self.db, &[r.id]).await?;
        Ok(RoleView { role: r, permissions })
    }
}

#[async_trait]
impl CrudService for RoleService {
    type Dto = RoleView;
    type CreateInput = CreateRole;
    type UpdateInput = UpdateRole;
    type ListQuery = RoleQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, name = %input.name))]
    async fn create(&self, ctx: &RequestContext, input: CreateRole) -> Result<RoleView, ServiceError> {
        ctx.require(permissions::ROLES_MANAGE)?;
        let name = role::validate_name(&input.name)?;
        let perms = normalize_permissions(input.permissions)?;
        let taken = role::Entity::find()
            .filter(role::Column::TenantId.eq(ctx.tenant_id))
            .filter(role::Column::Name.eq(name.clone()))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::conflict(format!("role '{name}' already exists")));
        }

        let txn = self.db.begin().await?;
        let created = role::create(&txn, ctx.tenant_id, &name, &input.display_name, false, input.is_default).await?;
        role_permission::replace_for_role(&txn, created.id, &perms).await?;
        txn.commit().await?;

        info!(role_id = %created.id, "role_created");
        activity::record(&self.db, ctx, "role", created.id, ActivityAction::Created, None).await;
        Ok(RoleView { role: created, permissions: perms })
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<RoleView, ServiceError> {
        ctx.require(permissions::ROLES_MANAGE)?;
        let r = lookup::role(&self.db, ctx.tenant_id, id).await?;
        self.view(r).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, role_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateRole) -> Result<RoleView, ServiceError> {
        ctx.require(permissions::ROLES_MANAGE)?;
        let existing = lookup::role(&self.db, ctx.tenant_id, id).await?;
        let perms = input.permissions.map(normalize_permissions).transpose()?;

        let txn = self.db.begin().await?;
        let mut am: role::ActiveModel = existing.into();
        if let Some(display) = input.display_name.as_deref() {
            am.display_name = Set(role::validate_display_name(display)?);
        }
        if let Some(is_default) = input.is_default {
            am.is_default = Set(is_default);
        }
        let updated = am.update(&txn).await?;
        if let Some(perms) = &perms {
            role_permission::replace_for_role(&txn, id, perms).await?;
        }
        txn.commit().await?;

        info!("role_updated");
        activity::record(&self.db, ctx, "role", id, ActivityAction::Updated, None).await;
        self.view(updated).await
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, role_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::ROLES_MANAGE)?;
        let existing = lookup::role(&self.db, ctx.tenant_id, id).await?;
        if existing.is_static {
            return Err(ServiceError::validation(format!("built-in role '{}' cannot be deleted", existing.name)));
        }
        role::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("role_deleted");
        activity::record(&self.db, ctx, "role", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: RoleQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<RoleView>, ServiceError> {
        ctx.require(permissions::ROLES_MANAGE)?;
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("name"))?;
        let mut select = role::Entity::find().filter(role::Column::TenantId.eq(ctx.tenant_id));
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(role::Column::Name.contains(n));
        }
        let column = match sort.field.as_str() {
            "created_at" => role::Column::CreatedAt,
            _ => role::Column::Name,
        };
        let page = fetch_page(&self.db, order_by(select, column, &sort), pagination).await?;
        let ids: Vec<Uuid> = page.items.iter().map(|r| r.id).collect();
        let grants = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(page.map(|r| {
            let mut permissions: Vec<String> = grants.iter().filter(|g| g.role_id == r.id).map(|g| g.permission.clone()).collect();
            permissions.sort();
            RoleView { role: r, permissions }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_are_checked_and_deduplicated() {
        let out = normalize_permissions(vec!["teams.read".into(), " projects.read ".into(), "teams.read".into()]).unwrap();
        assert_eq!(out, vec!["projects.read", "teams.read"]);
        assert!(normalize_permissions(vec!["teams.delete".into()]).is_err());
    }
}
