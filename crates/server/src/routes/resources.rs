//! Endpoints beyond plain CRUD: state machines, membership, inbox, audit
//! trail, tenant and user administration, dashboard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;

use models::{activity_log, milestone, notification, project, project_duty, tenant, user};
use service::services::{
    activity::ActivityQuery,
    dashboard::DashboardSummary,
    duties::{AssignDuty, ChangeDutyStatus},
    milestones::CompleteMilestone,
    notifications::{MarkedRead, NotificationQuery, UnreadCount},
    projects::ChangeProjectStatus,
    teams::{AddMember, TeamMember},
    tenants::RenameTenant,
    users::{SetRoles, UpdateUser, UserQuery, UserView},
};
use service::Page;

use super::auth::{CurrentUser, ServerState};
use super::crud::PageParams;
use crate::errors::JsonApiError;

type ApiResult<T> = Result<Json<T>, JsonApiError>;

#[utoipa::path(put, path = "/api/projects/{id}/status", tag = "projects", params(("id" = Uuid, Path, description = "Project id")),
    request_body = crate::openapi::StatusChangeRequest,
    responses((status = 200, description = "Status changed"), (status = 400, description = "Transition not allowed"), (status = 404, description = "Not Found")))]
pub async fn change_project_status(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ChangeProjectStatus>,
) -> ApiResult<project::Model> {
    Ok(Json(state.services.projects.change_status(&ctx, id, input).await?))
}

#[utoipa::path(put, path = "/api/duties/{id}/status", tag = "duties", params(("id" = Uuid, Path, description = "Duty id")),
    request_body = crate::openapi::StatusChangeRequest,
    responses((status = 200, description = "Status changed"), (status = 400, description = "Transition not allowed")))]
pub async fn change_duty_status(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ChangeDutyStatus>,
) -> ApiResult<project_duty::Model> {
    Ok(Json(state.services.duties.change_status(&ctx, id, input).await?))
}

#[utoipa::path(put, path = "/api/duties/{id}/assign", tag = "duties", params(("id" = Uuid, Path, description = "Duty id")),
    request_body = crate::openapi::AssignRequest, responses((status = 200, description = "Assignee set or cleared")))]
pub async fn assign_duty(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignDuty>,
) -> ApiResult<project_duty::Model> {
    Ok(Json(state.services.duties.assign(&ctx, id, input).await?))
}

#[utoipa::path(put, path = "/api/milestones/{id}/complete", tag = "timelines", params(("id" = Uuid, Path, description = "Milestone id")),
    request_body = crate::openapi::CompleteRequest, responses((status = 200, description = "Completion toggled")))]
pub async fn complete_milestone(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CompleteMilestone>,
) -> ApiResult<milestone::Model> {
    Ok(Json(state.services.milestones.complete(&ctx, id, input).await?))
}

async fn team_members(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> ApiResult<Vec<TeamMember>> {
    Ok(Json(state.services.teams.members(&ctx, id).await?))
}

async fn add_team_member(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AddMember>,
) -> Result<(StatusCode, Json<TeamMember>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(state.services.teams.add_member(&ctx, id, input).await?)))
}

async fn remove_team_member(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    state.services.teams.remove_member(&ctx, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<UserQuery>,
    Query(p): Query<PageParams>,
) -> ApiResult<Page<user::Model>> {
    Ok(Json(state.services.users.list(&ctx, query, p.pagination(), p.sorting.as_deref()).await?))
}

async fn get_user(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> ApiResult<UserView> {
    Ok(Json(state.services.users.get(&ctx, id).await?))
}

async fn update_user(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<UserView> {
    Ok(Json(state.services.users.update(&ctx, id, input).await?))
}

async fn delete_user(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    state.services.users.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_user_roles(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SetRoles>,
) -> ApiResult<UserView> {
    Ok(Json(state.services.users.set_roles(&ctx, id, input).await?))
}

async fn known_permissions(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> ApiResult<&'static [&'static str]> {
    ctx.require(service::context::permissions::ROLES_MANAGE)?;
    Ok(Json(state.services.roles.known_permissions()))
}

async fn current_tenant(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> ApiResult<tenant::Model> {
    Ok(Json(state.services.tenants.current(&ctx).await?))
}

async fn rename_tenant(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Json(input): Json<RenameTenant>) -> ApiResult<tenant::Model> {
    Ok(Json(state.services.tenants.rename(&ctx, input).await?))
}

async fn list_notifications(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<NotificationQuery>,
    Query(p): Query<PageParams>,
) -> ApiResult<Page<notification::Model>> {
    Ok(Json(state.services.notifications.list(&ctx, query, p.pagination()).await?))
}

async fn unread_count(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> ApiResult<UnreadCount> {
    Ok(Json(state.services.notifications.unread_count(&ctx).await?))
}

async fn mark_read(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> ApiResult<notification::Model> {
    Ok(Json(state.services.notifications.mark_read(&ctx, id).await?))
}

async fn mark_all_read(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> ApiResult<MarkedRead> {
    Ok(Json(state.services.notifications.mark_all_read(&ctx).await?))
}

async fn delete_notification(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    state.services.notifications.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_activity(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<ActivityQuery>,
    Query(p): Query<PageParams>,
) -> ApiResult<Page<activity_log::Model>> {
    Ok(Json(state.services.activity.list(&ctx, query, p.pagination()).await?))
}

async fn get_activity(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser, Path(id): Path<Uuid>) -> ApiResult<activity_log::Model> {
    Ok(Json(state.services.activity.get(&ctx, id).await?))
}

#[utoipa::path(get, path = "/api/dashboard", tag = "dashboard", responses((status = 200, description = "Tenant counters")))]
pub async fn dashboard(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> ApiResult<DashboardSummary> {
    Ok(Json(state.services.dashboard.summary(&ctx).await?))
}

pub fn resource_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/projects/:id/status", put(change_project_status))
        .route("/api/duties/:id/status", put(change_duty_status))
        .route("/api/duties/:id/assign", put(assign_duty))
        .route("/api/milestones/:id/complete", put(complete_milestone))
        .route("/api/teams/:id/members", get(team_members).post(add_team_member))
        .route("/api/teams/:id/members/:user_id", delete(remove_team_member))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/api/users/:id/roles", put(set_user_roles))
        .route("/api/permissions", get(known_permissions))
        .route("/api/tenant", get(current_tenant).put(rename_tenant))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/read-all", put(mark_all_read))
        .route("/api/notifications/:id", delete(delete_notification))
        .route("/api/notifications/:id/read", put(mark_read))
        .route("/api/activity-logs", get(list_activity))
        .route("/api/activity-logs/:id", get(get_activity))
        .route("/api/dashboard", get(dashboard))
}
