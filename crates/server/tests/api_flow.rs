//! Resource endpoints end to end over a real database.

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::{app, send, tenant_admin};

#[tokio::test]
async fn project_and_duty_lifecycle() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (_, token) = tenant_admin(&app).await?;
    let t = Some(token.as_str());

    let (status, project) = send(&app, "POST", "/api/projects", t, Some(json!({"name": "Apollo", "end_date": "2030-12-31"}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{project}");
    assert_eq!(project["status"], "not_started");
    let pid = project["id"].as_str().unwrap_or_default().to_string();

    let (status, duty) = send(&app, "POST", "/api/duties", t, Some(json!({"project_id": pid, "title": "Design"}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{duty}");
    let did = duty["id"].as_str().unwrap_or_default().to_string();

    // todo -> done skips the work
    let (status, _) = send(&app, "PUT", &format!("/api/duties/{did}/status"), t, Some(json!({"status": "done"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, duty) = send(&app, "PUT", &format!("/api/duties/{did}/status"), t, Some(json!({"status": "in_progress"}))).await?;
    assert_eq!(status, StatusCode::OK, "{duty}");
    let (_, project) = send(&app, "GET", &format!("/api/projects/{pid}"), t, None).await?;
    assert_eq!(project["status"], "in_progress");

    let (status, _) = send(&app, "PUT", &format!("/api/projects/{pid}/status"), t, Some(json!({"status": "completed"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, duty) = send(&app, "PUT", &format!("/api/duties/{did}/status"), t, Some(json!({"status": "done"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(duty["completed_at"].is_string());
    let (status, project) = send(&app, "PUT", &format!("/api/projects/{pid}/status"), t, Some(json!({"status": "completed"}))).await?;
    assert_eq!(status, StatusCode::OK, "{project}");

    let (status, page) = send(&app, "GET", &format!("/api/projects/{pid}/duties?per_page=5"), t, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["per_page"], 5);

    let (status, activity) = send(&app, "GET", "/api/activity-logs", t, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(activity["total"].as_u64().unwrap_or_default() >= 4);
    Ok(())
}

#[tokio::test]
async fn tenants_do_not_see_each_other() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (_, a) = tenant_admin(&app).await?;
    let (_, b) = tenant_admin(&app).await?;

    let (_, project) = send(&app, "POST", "/api/projects", Some(&a), Some(json!({"name": "Secret"}))).await?;
    let pid = project["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/projects/{pid}"), Some(&b), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    let (status, _) = send(&app, "DELETE", &format!("/api/projects/{pid}"), Some(&b), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, page) = send(&app, "GET", "/api/projects", Some(&b), None).await?;
    assert_eq!(page["total"], 0);
    Ok(())
}

#[tokio::test]
async fn deleted_project_disappears() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (_, token) = tenant_admin(&app).await?;
    let t = Some(token.as_str());

    let (_, project) = send(&app, "POST", "/api/projects", t, Some(json!({"name": "Short lived"}))).await?;
    let pid = project["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = send(&app, "DELETE", &format!("/api/projects/{pid}"), t, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/projects/{pid}"), t, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_input_maps_to_client_errors() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (_, token) = tenant_admin(&app).await?;
    let t = Some(token.as_str());

    let (status, _) = send(&app, "POST", "/api/projects", t, Some(json!({"name": "  "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/api/projects?sorting=password%20asc", t, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/teams", t, Some(json!({"name": "Core"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/api/teams", t, Some(json!({"name": "core"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    Ok(())
}

#[tokio::test]
async fn dashboard_reflects_new_rows() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (_, token) = tenant_admin(&app).await?;
    let t = Some(token.as_str());

    send(&app, "POST", "/api/projects", t, Some(json!({"name": "One"}))).await?;
    send(&app, "POST", "/api/projects", t, Some(json!({"name": "Two"}))).await?;
    let (status, summary) = send(&app, "GET", "/api/dashboard", t, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["projects_by_status"]["not_started"], 2);
    assert_eq!(summary["teams"], 0);
    Ok(())
}

#[tokio::test]
async fn disabled_user_loses_access_immediately() -> anyhow::Result<()> {
    let Some(db) = service::test_support::get_db().await else { return Ok(()) };
    let app = app(db);
    let (tenant_id, admin) = tenant_admin(&app).await?;

    let email = format!("member_{}@example.com", uuid::Uuid::new_v4());
    let (_, reg) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"tenant_id": tenant_id, "email": email, "name": "Member", "password": support::PASSWORD})),
    )
    .await?;
    let member_id = reg["user_id"].as_str().unwrap_or_default().to_string();
    let member = support::login(&app, tenant_id, &email, support::PASSWORD).await?;
    let (status, _) = send(&app, "GET", "/api/projects", Some(&member), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "PUT", &format!("/api/users/{member_id}"), Some(&admin), Some(json!({"status": "disabled"}))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = send(&app, "GET", "/api/projects", Some(&member), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/auth/me", Some(&member), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
