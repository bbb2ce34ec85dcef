use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub role_id: Uuid,
    pub permission: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Role }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Role => Entity::belongs_to(role::Entity).from(Column::RoleId).to(role::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Replace every grant of `role_id` with `permissions`.
pub async fn replace_for_role<C: ConnectionTrait>(db: &C, role_id: Uuid, permissions: &[String]) -> Result<(), errors::ModelError> {
    Entity::delete_many().filter(Column::RoleId.eq(role_id)).exec(db).await?;
    if permissions.is_empty() {
        return Ok(());
    }
    let rows = permissions.iter().map(|p| ActiveModel {
        id: Set(Uuid::new_v4()),
        role_id: Set(role_id),
        permission: Set(p.clone()),
    });
    Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

pub async fn list_for_roles<C: ConnectionTrait>(db: &C, role_ids: &[Uuid]) -> Result<Vec<String>, errors::ModelError> {
    if role_ids.is_empty() {
        return Ok(vec![]);
    }
    let rows = Entity::find().filter(Column::RoleId.is_in(role_ids.to_vec())).all(db).await?;
    let mut perms: Vec<String> = rows.into_iter().map(|r| r.permission).collect();
    perms.sort();
    perms.dedup();
    Ok(perms)
}
