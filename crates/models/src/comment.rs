use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project_duty, tenant, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub duty_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub edited: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Duty }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Duty => Entity::belongs_to(project_duty::Entity).from(Column::DutyId).to(project_duty::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_content(content: &str) -> Result<String, errors::ModelError> {
    validate::required_text("content", content, 4000)
}

pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id))
}
