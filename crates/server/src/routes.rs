pub mod auth;
pub mod crud;
pub mod resources;

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use self::auth::ServerState;
use self::crud::{child_router, crud_router};
use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

/// Count and time every request.
async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();
    let response = next.run(req).await;
    common::metrics::observe_http(&method, response.status().as_u16(), start.elapsed().as_secs_f64());
    response
}

fn api_routes(state: &ServerState) -> Router<ServerState> {
    let s = &state.services;
    Router::new()
        .merge(crud_router("/api/roles", s.roles.clone()))
        .merge(crud_router("/api/teams", s.teams.clone()))
        .merge(crud_router("/api/people", s.people.clone()))
        .merge(crud_router("/api/projects", s.projects.clone()))
        .merge(crud_router("/api/duties", s.duties.clone()))
        .merge(crud_router("/api/timelines", s.timelines.clone()))
        .merge(crud_router("/api/phases", s.phases.clone()))
        .merge(crud_router("/api/milestones", s.milestones.clone()))
        .merge(crud_router("/api/documents", s.documents.clone()))
        .merge(crud_router("/api/comments", s.comments.clone()))
        .merge(child_router("/api/projects", "duties", s.duties.clone()))
        .merge(child_router("/api/projects", "timelines", s.timelines.clone()))
        .merge(child_router("/api/projects", "milestones", s.milestones.clone()))
        .merge(child_router("/api/projects", "documents", s.documents.clone()))
        .merge(child_router("/api/timelines", "phases", s.phases.clone()))
        .merge(child_router("/api/duties", "comments", s.comments.clone()))
        .merge(resources::resource_routes())
}

/// Build the full application: auth, API, docs, metrics and dashboard assets.
pub fn build_router(state: ServerState, cors: CorsLayer, frontend_dir: &str) -> Router {
    let static_dir = ServeDir::new(frontend_dir).fallback(ServeFile::new(format!("{frontend_dir}/index.html")));

    let auth_routes = Router::new()
        .route("/auth/register-tenant", post(auth::register_tenant))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(auth_routes)
        .merge(api_routes(&state))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(static_dir)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
