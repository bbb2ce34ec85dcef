use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project, project_duty, tenant, validate};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub duty_id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Project, Duty }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Project => Entity::belongs_to(project::Entity).from(Column::ProjectId).to(project::Column::Id).into(),
            Relation::Duty => Entity::belongs_to(project_duty::Entity).from(Column::DutyId).to(project_duty::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("document name", name, 255)
}

pub fn validate_url(u: &str) -> Result<String, errors::ModelError> {
    let u = u.trim();
    let rest = u.strip_prefix("https://").or_else(|| u.strip_prefix("http://"));
    match rest {
        Some(r) if !r.is_empty() => Ok(u.to_string()),
        _ => Err(errors::ModelError::validation("url must start with http(s)://")),
    }
}

/// `type/subtype`; missing values fall back to `application/octet-stream`.
pub fn validate_content_type(ct: Option<&str>) -> Result<String, errors::ModelError> {
    let ct = match ct.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_CONTENT_TYPE.to_string()),
        Some(c) => c.to_ascii_lowercase(),
    };
    match ct.split_once('/') {
        Some((t, s)) if !t.is_empty() && !s.is_empty() && !s.contains('/') && ct.len() <= 128 => Ok(ct),
        _ => Err(errors::ModelError::validation("content_type must look like type/subtype")),
    }
}

pub fn validate_size(size: i64) -> Result<i64, errors::ModelError> {
    if size < 0 {
        return Err(errors::ModelError::validation("size_bytes must be >= 0"));
    }
    Ok(size)
}

pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_rules() {
        assert!(validate_url("https://files.example.com/a.pdf").is_ok());
        assert!(validate_url("ftp://x").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[test]
    fn content_type_rules() {
        assert_eq!(validate_content_type(None).unwrap(), DEFAULT_CONTENT_TYPE);
        assert_eq!(validate_content_type(Some("Application/PDF")).unwrap(), "application/pdf");
        assert!(validate_content_type(Some("pdf")).is_err());
        assert!(validate_content_type(Some("a/b/c")).is_err());
    }

    #[test]
    fn size_rules() {
        assert!(validate_size(-1).is_err());
        assert_eq!(validate_size(0).unwrap(), 0);
    }
}
