#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "S3curePass!";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.server.frontend_dir = "target/no-frontend".into();
    cfg
}

pub fn app(db: DatabaseConnection) -> Router {
    let cfg = test_config();
    server::build_app(server::build_state(db, &cfg), &cfg)
}

pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

/// A fresh tenant with its administrator logged in. Returns (tenant_id, token).
pub async fn tenant_admin(app: &Router) -> anyhow::Result<(Uuid, String)> {
    let email = format!("admin_{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        app,
        "POST",
        "/auth/register-tenant",
        None,
        Some(json!({"tenant_name": format!("Tenant {}", Uuid::new_v4()), "email": email, "name": "Admin", "password": PASSWORD})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let tenant_id: Uuid = serde_json::from_value(body["tenant_id"].clone())?;
    let token = login(app, tenant_id, &email, PASSWORD).await?;
    Ok((tenant_id, token))
}

pub async fn login(app: &Router, tenant_id: Uuid, email: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send(app, "POST", "/auth/login", None, Some(json!({"tenant_id": tenant_id, "email": email, "password": password}))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}
