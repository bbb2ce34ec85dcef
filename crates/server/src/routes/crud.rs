//! Generic REST mapping for any `CrudService`:
//! `GET/POST {base}`, `GET/PUT/DELETE {base}/:id`, and the
//! `GET {parent}/:id/{child}` listing for `ChildListing` services.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use service::{ChildListing, CrudService, Page, Pagination};

use super::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;

/// `page`, `per_page` and `sorting` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// `"<field> [asc|desc]"`
    pub sorting: Option<String>,
}

impl PageParams {
    pub fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination::new(self.page.unwrap_or(d.page), self.per_page.unwrap_or(d.per_page))
    }
}

async fn list<S: CrudService>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<S::ListQuery>,
    Query(p): Query<PageParams>,
) -> Result<Json<Page<S::Dto>>, JsonApiError> {
    Ok(Json(svc.list(&ctx, query, p.pagination(), p.sorting.as_deref()).await?))
}

async fn create<S: CrudService>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Json(input): Json<S::CreateInput>,
) -> Result<(StatusCode, Json<S::Dto>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(svc.create(&ctx, input).await?)))
}

async fn get_one<S: CrudService>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<S::Dto>, JsonApiError> {
    Ok(Json(svc.get(&ctx, id).await?))
}

async fn update<S: CrudService>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<S::UpdateInput>,
) -> Result<Json<S::Dto>, JsonApiError> {
    Ok(Json(svc.update(&ctx, id, input).await?))
}

async fn remove<S: CrudService>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    svc.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_children<S: ChildListing>(
    State(svc): State<Arc<S>>,
    CurrentUser(ctx): CurrentUser,
    Path(parent_id): Path<Uuid>,
    Query(query): Query<S::ListQuery>,
    Query(p): Query<PageParams>,
) -> Result<Json<Page<S::Dto>>, JsonApiError> {
    Ok(Json(svc.list_for_parent(&ctx, parent_id, query, p.pagination(), p.sorting.as_deref()).await?))
}

/// Routes for one resource rooted at `base`, e.g. `/api/teams`.
pub fn crud_router<S: CrudService>(base: &str, svc: Arc<S>) -> Router<ServerState> {
    Router::new()
        .route(base, get(list::<S>).post(create::<S>))
        .route(&format!("{base}/:id"), get(get_one::<S>).put(update::<S>).delete(remove::<S>))
        .with_state(svc)
}

/// `GET {parent}/:id/{child}`, e.g. `/api/projects/:id/duties`.
pub fn child_router<S: ChildListing>(parent: &str, child: &str, svc: Arc<S>) -> Router<ServerState> {
    Router::new()
        .route(&format!("{parent}/:id/{child}"), get(list_children::<S>))
        .with_state(svc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_fall_back_to_defaults() {
        let p = PageParams::default().pagination();
        assert_eq!((p.page, p.per_page), (1, 20));
        let p = PageParams { page: Some(3), per_page: Some(50), sorting: None }.pagination();
        assert_eq!((p.page, p.per_page), (3, 50));
    }
}
