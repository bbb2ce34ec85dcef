use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
pub struct RegisterTenantRequest { pub tenant_name: String, pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub tenant_id: Uuid, pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub tenant_id: Uuid, pub email: String, pub password: String }

/// Target status of a project or duty, in snake_case.
#[derive(ToSchema)]
pub struct StatusChangeRequest { pub status: String }

#[derive(ToSchema)]
pub struct AssignRequest { pub assignee_id: Option<Uuid> }

#[derive(ToSchema)]
pub struct CompleteRequest { pub completed: bool }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register_tenant,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::resources::change_project_status,
        crate::routes::resources::change_duty_status,
        crate::routes::resources::assign_duty,
        crate::routes::resources::complete_milestone,
        crate::routes::resources::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterTenantRequest,
            RegisterRequest,
            LoginRequest,
            StatusChangeRequest,
            AssignRequest,
            CompleteRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "projects"),
        (name = "duties"),
        (name = "timelines"),
        (name = "dashboard")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_state_machine_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/projects/{id}/status"));
        assert!(doc.paths.paths.contains_key("/auth/login"));
    }
}
