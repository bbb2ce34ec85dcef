use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, role, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, Role }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Role => Entity::belongs_to(role::Entity).from(Column::RoleId).to(role::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn assign<C: ConnectionTrait>(db: &C, user_id: Uuid, role_id: Uuid) -> Result<Model, errors::ModelError> {
    let am = ActiveModel { id: Set(Uuid::new_v4()), user_id: Set(user_id), role_id: Set(role_id) };
    Ok(am.insert(db).await?)
}

pub async fn replace_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), errors::ModelError> {
    Entity::delete_many().filter(Column::UserId.eq(user_id)).exec(db).await?;
    for role_id in role_ids {
        assign(db, user_id, *role_id).await?;
    }
    Ok(())
}

/// Roles held by a user, ordered by name.
pub async fn roles_of<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<role::Model>, errors::ModelError> {
    let ids: Vec<Uuid> = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|ur| ur.role_id)
        .collect();
    if ids.is_empty() {
        return Ok(vec![]);
    }
    Ok(role::Entity::find()
        .filter(role::Column::Id.is_in(ids))
        .order_by_asc(role::Column::Name)
        .all(db)
        .await?)
}
