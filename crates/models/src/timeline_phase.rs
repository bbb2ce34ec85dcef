use sea_orm::{entity::prelude::*, QueryFilter, Select};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, tenant, timeline, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline_phase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub timeline_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn range(&self) -> (Date, Date) { (self.start_date, self.end_date) }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant, Timeline }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity).from(Column::TenantId).to(tenant::Column::Id).into(),
            Relation::Timeline => Entity::belongs_to(timeline::Entity).from(Column::TimelineId).to(timeline::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validate::required_text("phase name", name, 128)
}

/// Inclusive ranges sharing at least one day.
pub fn overlaps(a: (Date, Date), b: (Date, Date)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Ordered, inside the timeline, and disjoint from every sibling phase.
pub fn validate_placement(
    range: (Date, Date),
    timeline_range: (Date, Date),
    siblings: &[Model],
) -> Result<(), errors::ModelError> {
    validate::date_range(range.0, range.1)?;
    if !validate::within(range, timeline_range) {
        return Err(errors::ModelError::validation("phase must lie within the timeline dates"));
    }
    if let Some(other) = siblings.iter().find(|p| overlaps(range, p.range())) {
        return Err(errors::ModelError::validation(format!("phase overlaps phase '{}'", other.name)));
    }
    Ok(())
}

pub fn validate_sort_order(order: i32) -> Result<i32, errors::ModelError> {
    if order < 0 {
        return Err(errors::ModelError::validation("sort_order must be >= 0"));
    }
    Ok(order)
}

pub fn find_in_tenant(tenant_id: Uuid) -> Select<Entity> {
    Entity::find().filter(Column::TenantId.eq(tenant_id))
}
