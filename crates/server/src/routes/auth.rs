use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use service::auth::domain::{AuthSession, AuthUser, LoginInput, MeView, RegisterInput, RegisterTenantInput};
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::AuthService;
use service::auth::token::Claims;
use service::{RequestContext, Services};

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

/// Shared application state.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub services: Services,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub cookie_secure: bool,
}

/// The authenticated caller, built from the claims the middleware stored.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestContext);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(|c| CurrentUser(c.to_context()))
            .ok_or_else(|| JsonApiError::unauthorized("missing credentials"))
    }
}

/// Paths reachable without a token.
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        return true;
    }
    matches!(path, "/health" | "/metrics" | "/auth/login" | "/auth/register" | "/auth/register-tenant" | "/auth/logout")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        // dashboard assets
        || !(path.starts_with("/api") || path.starts_with("/auth"))
}

fn bearer_or_cookie(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("expected Authorization: Bearer <token>")),
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|v| !v.is_empty()))
}

/// Global middleware: every `/api` and `/auth` route outside the whitelist
/// needs a valid token, read from `Authorization: Bearer` or the cookie,
/// whose user is still active.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }
    let Some(token) = bearer_or_cookie(&req)? else {
        warn!(%path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("missing credentials"));
    };
    match state.auth.authenticate(&token).await {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e @ AuthError::Repository(_)) => Err(e.into()),
        Err(e) => {
            warn!(%path, error = %e, "token validation failed");
            Err(JsonApiError::unauthorized("invalid or expired token"))
        }
    }
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

impl From<AuthUser> for RegisterOutput {
    fn from(u: AuthUser) -> Self { Self { user_id: u.id, tenant_id: u.tenant_id } }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/auth/register-tenant", tag = "auth", request_body = crate::openapi::RegisterTenantRequest,
    responses((status = 201, description = "Tenant and admin created"), (status = 400, description = "Validation Error"), (status = 409, description = "Conflict")))]
pub async fn register_tenant(
    State(state): State<ServerState>,
    Json(input): Json<RegisterTenantInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let admin = state.auth.register_tenant(input).await?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Validation Error"), (status = 404, description = "Unknown tenant"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in, token in body and cookie"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.cookie_secure));
    Ok((jar, Json(session)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> Result<Json<MeView>, JsonApiError> {
    let view = state.auth.me(&ctx).await?;
    info!(user_id = %ctx.user_id, "me");
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/auth/login"));
        assert!(is_public(&Method::GET, "/docs/index.html"));
        assert!(is_public(&Method::GET, "/assets/app.js"));
        assert!(is_public(&Method::OPTIONS, "/api/projects"));
        assert!(!is_public(&Method::GET, "/api/projects"));
        assert!(!is_public(&Method::GET, "/auth/me"));
    }
}
