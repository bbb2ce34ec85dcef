use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

use super::setup_test_db;
use crate::{activity_log, notification, project, project_duty, role, role_permission, tenant, user, user_credentials, user_role};

/// Test tenant and user lifecycle
#[tokio::test]
async fn test_tenant_user_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let tenant_name = format!("test_tenant_{}", Uuid::new_v4());
    let t = tenant::create(&db, &tenant_name).await?;
    assert_eq!(t.name, tenant_name);
    assert_eq!(tenant::find_by_name(&db, &tenant_name).await?.map(|x| x.id), Some(t.id));

    let u = user::create(&db, t.id, " Bob@Example.com ", "Bob").await?;
    assert_eq!(u.email, "bob@example.com");
    assert!(u.is_active());
    let found = user::find_by_tenant_email(&db, t.id, "BOB@example.com").await?;
    assert_eq!(found.map(|x| x.id), Some(u.id));

    user::soft_delete(&db, u.id).await?;
    assert_eq!(user::find_in_tenant(t.id).count(&db).await?, 0);

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());

    tenant::Entity::delete_by_id(t.id).exec(&db).await?;
    Ok(())
}

/// Test credentials upsert keeps a single row per user
#[tokio::test]
async fn test_credentials_upsert() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let t = tenant::create(&db, &format!("cred_{}", Uuid::new_v4())).await?;
    let u = user::create(&db, t.id, "cred@example.com", "Cred").await?;
    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2id").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2id").await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.password_hash, "hash-2");
    assert!(user_credentials::upsert_password(&db, u.id, "  ".into(), "argon2id").await.is_err());

    tenant::Entity::delete_by_id(t.id).exec(&db).await?;
    Ok(())
}

/// Test role grants and assignment
#[tokio::test]
async fn test_roles_and_permissions() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let t = tenant::create(&db, &format!("roles_{}", Uuid::new_v4())).await?;
    let u = user::create(&db, t.id, "roles@example.com", "Roles").await?;
    let admin = role::create(&db, t.id, role::ADMIN, "Administrator", true, false).await?;
    let member = role::create(&db, t.id, role::MEMBER, "Member", true, true).await?;

    role_permission::replace_for_role(&db, admin.id, &["users.manage".into(), "projects.write".into()]).await?;
    role_permission::replace_for_role(&db, member.id, &["projects.read".into(), "projects.write".into()]).await?;
    user_role::replace_for_user(&db, u.id, &[member.id, admin.id]).await?;

    let roles = user_role::roles_of(&db, u.id).await?;
    assert_eq!(roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["admin", "member"]);

    let perms = role_permission::list_for_roles(&db, &[admin.id, member.id]).await?;
    assert_eq!(perms, vec!["projects.read", "projects.write", "users.manage"]);

    user_role::replace_for_user(&db, u.id, &[]).await?;
    assert!(user_role::roles_of(&db, u.id).await?.is_empty());

    tenant::Entity::delete_by_id(t.id).exec(&db).await?;
    Ok(())
}

/// Test project, duty, activity and notification rows share the tenant scope
#[tokio::test]
async fn test_project_duty_scoping() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let t1 = tenant::create(&db, &format!("scope_a_{}", Uuid::new_v4())).await?;
    let t2 = tenant::create(&db, &format!("scope_b_{}", Uuid::new_v4())).await?;
    let u = user::create(&db, t1.id, "scope@example.com", "Scope").await?;
    let now = Utc::now();

    let p = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(t1.id),
        name: Set("Apollo".into()),
        description: Set(None),
        status: Set(project::ProjectStatus::NotStarted),
        team_id: Set(None),
        manager_id: Set(None),
        start_date: Set(None),
        end_date: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(&db)
    .await?;

    let d = project_duty::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(t1.id),
        project_id: Set(p.id),
        title: Set("Design".into()),
        description: Set(None),
        status: Set(project_duty::DutyStatus::Todo),
        priority: Set(project_duty::DutyPriority::High),
        assignee_id: Set(Some(u.id)),
        due_date: Set(None),
        completed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(&db)
    .await?;
    assert_eq!(d.status, project_duty::DutyStatus::Todo);

    assert_eq!(project::find_in_tenant(t1.id).count(&db).await?, 1);
    assert_eq!(project::find_in_tenant(t2.id).count(&db).await?, 0);
    assert_eq!(project_duty::find_in_tenant(t2.id).count(&db).await?, 0);

    activity_log::append(&db, t1.id, Some(u.id), "project", p.id, activity_log::ActivityAction::Created, None).await?;
    assert_eq!(activity_log::find_in_tenant(t1.id).count(&db).await?, 1);

    let target = notification::Target { entity_type: "duty", entity_id: d.id };
    let n = notification::create(&db, t1.id, u.id, notification::NotificationKind::DutyAssigned, "Assigned", "Design", Some(target)).await?;
    assert!(!n.is_read);
    assert_eq!(notification::find_for_user(t1.id, u.id).count(&db).await?, 1);
    assert_eq!(notification::find_for_user(t2.id, u.id).count(&db).await?, 0);

    tenant::Entity::delete_by_id(t1.id).exec(&db).await?;
    tenant::Entity::delete_by_id(t2.id).exec(&db).await?;
    Ok(())
}
