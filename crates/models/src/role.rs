use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, tenant, validate};

pub const ADMIN: &str = "admin";
pub const MEMBER: &str = "member";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub display_name: String,
    pub is_static: bool,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lowercase letters, digits, `_` and `-`; 1..=64 chars.
pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    let n = validate::required_text("role name", name, 64)?;
    if !n.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
        return Err(errors::ModelError::validation("role name may only contain a-z, 0-9, '_' and '-'"));
    }
    Ok(n)
}

pub fn validate_display_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("display name", name, 128)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    name: &str,
    display_name: &str,
    is_static: bool,
    is_default: bool,
) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(validate_name(name)?),
        display_name: Set(validate_display_name(display_name)?),
        is_static: Set(is_static),
        is_default: Set(is_default),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::validate_name;

    #[test]
    fn role_names() {
        assert_eq!(validate_name(" project-leads ").unwrap(), "project-leads");
        assert!(validate_name("Admins").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("").is_err());
    }
}
