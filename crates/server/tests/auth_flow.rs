mod support;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use support::{app, login, send, tenant_admin, PASSWORD};

#[tokio::test]
async fn register_login_and_me() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (tenant_id, admin_token) = tenant_admin(&app).await?;

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"tenant_id": tenant_id, "email": email, "name": "Member", "password": PASSWORD})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let token = login(&app, tenant_id, &email, PASSWORD).await?;
    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], email.as_str());
    assert_eq!(me["roles"], json!(["member"]));

    let (status, me) = send(&app, "GET", "/auth/me", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["roles"], json!(["admin"]));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (tenant_id, _) = tenant_admin(&app).await?;
    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"tenant_id": tenant_id, "email": "nobody@example.com", "password": "wrong-password"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn short_password_is_rejected() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (tenant_id, _) = tenant_admin(&app).await?;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"tenant_id": tenant_id, "email": "a@b.com", "name": "A", "password": "short"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn unknown_tenant_cannot_register() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"tenant_id": Uuid::new_v4(), "email": "x@example.com", "name": "X", "password": PASSWORD})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
