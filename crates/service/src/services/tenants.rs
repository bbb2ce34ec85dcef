use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use models::activity_log::ActivityAction;
use models::tenant;

use super::activity;
use crate::context::{permissions, RequestContext};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct RenameTenant {
    pub name: String,
}

pub struct TenantService {
    db: DatabaseConnection,
}

impl TenantService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    pub async fn current(&self, ctx: &RequestContext) -> Result<tenant::Model, ServiceError> {
        ctx.require(permissions::TENANT_MANAGE)?;
        tenant::Entity::find_by_id(ctx.tenant_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("tenant"))
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn rename(&self, ctx: &RequestContext, input: RenameTenant) -> Result<tenant::Model, ServiceError> {
        let current = self.current(ctx).await?;
        let name = tenant::validate_name(&input.name)?;
        if name == current.name {
            return Ok(current);
        }
        let taken = tenant::Entity::find()
            .filter(tenant::Column::Name.eq(name.clone()))
            .filter(tenant::Column::Id.ne(ctx.tenant_id))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::conflict(format!("tenant '{name}' already exists")));
        }
        let mut am: tenant::ActiveModel = current.into();
        am.name = Set(name);
        let updated = am.update(&self.db).await?;
        info!(name = %updated.name, "tenant_renamed");
        activity::record(&self.db, ctx, "tenant", updated.id, ActivityAction::Updated, None).await;
        Ok(updated)
    }
}
