//! Tenant-scoped lookups. A row of another tenant is simply not found.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use models::{person, project, project_duty, role, team, timeline, user};

use crate::errors::ServiceError;

pub(crate) async fn user<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<user::Model, ServiceError> {
    user::find_in_tenant(tenant_id)
        .filter(user::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
}

pub(crate) async fn role<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<role::Model, ServiceError> {
    role::Entity::find_by_id(id)
        .filter(role::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("role"))
}

pub(crate) async fn team<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<team::Model, ServiceError> {
    team::find_in_tenant(tenant_id)
        .filter(team::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("team"))
}

pub(crate) async fn person<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<person::Model, ServiceError> {
    person::find_in_tenant(tenant_id)
        .filter(person::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("person"))
}

pub(crate) async fn project<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<project::Model, ServiceError> {
    project::find_in_tenant(tenant_id)
        .filter(project::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("project"))
}

/// Like [`project`], but the project must still accept duty changes.
pub(crate) async fn open_project<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<project::Model, ServiceError> {
    let p = project(db, tenant_id, id).await?;
    if p.status.is_closed() {
        return Err(ServiceError::validation(format!("project is {}", p.status.as_str())));
    }
    Ok(p)
}

pub(crate) async fn duty<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<project_duty::Model, ServiceError> {
    project_duty::find_in_tenant(tenant_id)
        .filter(project_duty::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("duty"))
}

pub(crate) async fn timeline<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> Result<timeline::Model, ServiceError> {
    timeline::find_in_tenant(tenant_id)
        .filter(timeline::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("timeline"))
}

/// A body field pointing at a missing row is a bad request, not a missing resource.
pub(crate) fn referenced<T>(res: Result<T, ServiceError>, field: &str) -> Result<T, ServiceError> {
    match res {
        Err(ServiceError::NotFound(_)) => Err(ServiceError::validation(format!("{field} does not refer to an existing record"))),
        other => other,
    }
}
