use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Select, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, tenant, validate};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DISABLED: &str = "disabled";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    pub fn is_active(&self) -> bool { self.status == STATUS_ACTIVE && self.deleted_at.is_none() }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Tenant,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<String, errors::ModelError> { validate::email(email) }

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> { validate::required_text("name", name, 128) }

pub fn validate_status(status: &str) -> Result<String, errors::ModelError> {
    match status {
        STATUS_ACTIVE | STATUS_DISABLED => Ok(status.to_string()),
        _ => Err(errors::ModelError::validation("status must be active or disabled")),
    }
}

/// Live (not soft-deleted) users of a tenant.
pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id)).filter(Column::DeletedAt.is_null())
}

pub async fn find_by_tenant_email<C: ConnectionTrait>(db: &C, tenant_id: Uuid, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::Email.eq(email.trim().to_ascii_lowercase()))
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(db: &C, tenant_id: Uuid, email: &str, name: &str) -> Result<Model, errors::ModelError> {
    let email = validate_email(email)?;
    let name = validate_name(name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        email: Set(email),
        name: Set(name),
        status: Set(STATUS_ACTIVE.into()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id).one(db).await?.ok_or_else(|| errors::ModelError::validation("user not found"))?.into();
    let now = Utc::now();
    found.deleted_at = Set(Some(now.into()));
    found.updated_at = Set(now.into());
    found.update(db).await?;
    Ok(())
}

