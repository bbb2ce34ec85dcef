//! Database-backed service tests. Each test registers its own tenant, so
//! they can share one database.

use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::auth::domain::{RegisterInput, RegisterTenantInput};
use crate::auth::repo::seaorm::SeaOrmAuthRepository;
use crate::auth::service::{AuthConfig, AuthService};
use crate::context::{permissions, RequestContext};
use crate::crud::{ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::test_support::get_db;
use models::project::ProjectStatus;
use models::project_duty::DutyStatus;
use sea_orm::prelude::Date;

struct Fixture {
    services: Services,
    admin: RequestContext,
    member: RequestContext,
}

async fn fixture(db: sea_orm::DatabaseConnection) -> anyhow::Result<Fixture> {
    let auth = AuthService::new(Arc::new(SeaOrmAuthRepository { db: db.clone() }), AuthConfig::new("test-secret", 1));
    let suffix = Uuid::new_v4().simple().to_string();
    let admin = auth
        .register_tenant(RegisterTenantInput {
            tenant_name: format!("tenant-{suffix}"),
            email: format!("admin-{suffix}@example.com"),
            name: "Admin".into(),
            password: "Secret123".into(),
        })
        .await?;
    let member = auth
        .register(RegisterInput {
            tenant_id: admin.tenant_id,
            email: format!("member-{suffix}@example.com"),
            name: "Member".into(),
            password: "Secret123".into(),
        })
        .await?;
    Ok(Fixture {
        services: Services::new(db),
        admin: RequestContext::new(admin.tenant_id, admin.id, vec!["admin".into()], permissions::admin_defaults()),
        member: RequestContext::new(admin.tenant_id, member.id, vec!["member".into()], permissions::member_defaults()),
    })
}

fn day(m: u32, d: u32) -> Date { Date::from_ymd_opt(2030, m, d).unwrap() }

async fn project(f: &Fixture, name: &str) -> anyhow::Result<models::project::Model> {
    let p = f
        .services
        .projects
        .create(
            &f.admin,
            projects::CreateProject {
                name: name.into(),
                description: None,
                team_id: None,
                manager_id: None,
                start_date: Some(day(1, 1)),
                end_date: Some(day(12, 31)),
            },
        )
        .await?;
    Ok(p)
}

async fn duty(f: &Fixture, project_id: Uuid, assignee: Option<Uuid>) -> anyhow::Result<models::project_duty::Model> {
    let d = f
        .services
        .duties
        .create(
            &f.admin,
            duties::CreateDuty {
                project_id,
                title: "Write docs".into(),
                description: None,
                priority: None,
                assignee_id: assignee,
                due_date: Some(day(6, 1)),
            },
        )
        .await?;
    Ok(d)
}

#[tokio::test]
async fn project_and_duty_lifecycle() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Launch").await?;
    assert_eq!(p.status, ProjectStatus::NotStarted);
    let d = duty(&f, p.id, None).await?;
    assert_eq!(d.status, DutyStatus::Todo);

    // leaving todo starts the project
    let d = f.services.duties.change_status(&f.member, d.id, duties::ChangeDutyStatus { status: DutyStatus::InProgress }).await?;
    let p = f.services.projects.get(&f.admin, p.id).await?;
    assert_eq!(p.status, ProjectStatus::InProgress);

    let err = f
        .services
        .projects
        .change_status(&f.admin, p.id, projects::ChangeProjectStatus { status: ProjectStatus::Completed })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let d = f.services.duties.change_status(&f.member, d.id, duties::ChangeDutyStatus { status: DutyStatus::Done }).await?;
    assert!(d.completed_at.is_some());
    let p = f
        .services
        .projects
        .change_status(&f.admin, p.id, projects::ChangeProjectStatus { status: ProjectStatus::Completed })
        .await?;
    assert_eq!(p.status, ProjectStatus::Completed);

    // closed projects reject duty changes
    let err = duty(&f, p.id, None).await.unwrap_err();
    assert!(err.to_string().contains("completed"));
    Ok(())
}

#[tokio::test]
async fn invalid_duty_transition_is_rejected() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Transitions").await?;
    let d = duty(&f, p.id, None).await?;
    let err = f
        .services
        .duties
        .change_status(&f.admin, d.id, duties::ChangeDutyStatus { status: DutyStatus::Done })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn other_tenants_rows_are_not_found() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let a = fixture(db.clone()).await?;
    let b = fixture(db).await?;
    let p = project(&a, "Private").await?;
    let err = b.services.projects.get(&b.admin, p.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    let page = b.services.projects.list(&b.admin, Default::default(), Pagination::default(), None).await?;
    assert!(page.items.iter().all(|x| x.tenant_id == b.admin.tenant_id));
    Ok(())
}

#[tokio::test]
async fn member_cannot_write_projects() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let err = f
        .services
        .projects
        .create(
            &f.member,
            projects::CreateProject { name: "Nope".into(), description: None, team_id: None, manager_id: None, start_date: None, end_date: None },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    Ok(())
}

#[tokio::test]
async fn deleting_project_hides_its_duties() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Doomed").await?;
    let d = duty(&f, p.id, None).await?;
    f.services.projects.delete(&f.admin, p.id).await?;
    assert!(matches!(f.services.projects.get(&f.admin, p.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.duties.get(&f.admin, d.id).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn phases_must_not_overlap() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Schedule").await?;
    let t = f
        .services
        .timelines
        .create(&f.admin, timelines::CreateTimeline { project_id: p.id, name: "H1".into(), start_date: day(1, 1), end_date: day(6, 30) })
        .await?;
    let first = f
        .services
        .phases
        .create(&f.admin, phases::CreatePhase { timeline_id: t.id, name: "Design".into(), start_date: day(1, 1), end_date: day(1, 31), sort_order: None })
        .await?;
    assert_eq!(first.sort_order, 0);
    let second = f
        .services
        .phases
        .create(&f.admin, phases::CreatePhase { timeline_id: t.id, name: "Build".into(), start_date: day(2, 1), end_date: day(3, 31), sort_order: None })
        .await?;
    assert_eq!(second.sort_order, 1);

    let err = f
        .services
        .phases
        .create(&f.admin, phases::CreatePhase { timeline_id: t.id, name: "Clash".into(), start_date: day(1, 31), end_date: day(2, 5), sort_order: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // shrinking the timeline below its phases is rejected
    let err = f
        .services
        .timelines
        .update(&f.admin, t.id, timelines::UpdateTimeline { end_date: Some(day(2, 15)), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let listed = f.services.phases.list_for_parent(&f.admin, t.id, Default::default(), Pagination::default(), None).await?;
    assert_eq!(listed.items.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Design", "Build"]);
    Ok(())
}

#[tokio::test]
async fn comments_notify_assignee_and_guard_authorship() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Talk").await?;
    let d = duty(&f, p.id, Some(f.member.user_id)).await?;

    let c = f
        .services
        .comments
        .create(&f.admin, comments::CreateComment { duty_id: d.id, content: "  Looks good  ".into() })
        .await?;
    assert_eq!(c.content, "Looks good");

    // one for the assignment, one for the comment
    let unread = f.services.notifications.unread_count(&f.member).await?;
    assert_eq!(unread.unread, 2);

    let err = f
        .services
        .comments
        .update(&f.member, c.id, comments::UpdateComment { content: "hijack".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let edited = f.services.comments.update(&f.admin, c.id, comments::UpdateComment { content: "Looks great".into() }).await?;
    assert!(edited.edited);
    Ok(())
}

#[tokio::test]
async fn team_names_are_unique_ignoring_case() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    f.services.teams.create(&f.admin, teams::CreateTeam { name: "Platform".into(), description: None }).await?;
    let err = f
        .services
        .teams
        .create(&f.admin, teams::CreateTeam { name: "platform".into(), description: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let err = f
        .services
        .duties
        .list(&f.admin, Default::default(), Pagination::default(), Some("password desc"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_tenant_rows() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Metrics").await?;
    duty(&f, p.id, Some(f.member.user_id)).await?;
    let summary = f.services.dashboard.summary(&f.member).await?;
    assert_eq!(summary.projects_by_status["not_started"], 1);
    assert_eq!(summary.duties_by_status["todo"], 1);
    assert_eq!(summary.my_open_duties, 1);
    assert_eq!(summary.unread_notifications, 1);
    Ok(())
}

fn milestone_input(project_id: Uuid, timeline_id: Option<Uuid>, due_date: Date) -> milestones::CreateMilestone {
    milestones::CreateMilestone { project_id, timeline_id, name: "Beta".into(), description: None, due_date }
}

fn document_input(project_id: Uuid) -> documents::CreateDocument {
    documents::CreateDocument {
        project_id,
        duty_id: None,
        name: "plan.pdf".into(),
        url: "https://files.example.com/plan.pdf".into(),
        content_type: Some("application/pdf".into()),
        size_bytes: 1024,
    }
}

#[tokio::test]
async fn rescheduling_keeps_duties_and_milestones_inside() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Reschedule").await?;
    let d = duty(&f, p.id, None).await?;
    f.services
        .duties
        .update(&f.admin, d.id, duties::UpdateDuty { due_date: Some(Some(day(12, 1))), ..Default::default() })
        .await?;
    let m = f.services.milestones.create(&f.admin, milestone_input(p.id, None, day(11, 1))).await?;

    let shrink = || projects::UpdateProject { end_date: Some(Some(day(6, 30))), ..Default::default() };
    let err = f.services.projects.update(&f.admin, p.id, shrink()).await.unwrap_err();
    assert!(matches!(&err, ServiceError::Validation(msg) if msg.contains("duty")));

    f.services
        .duties
        .update(&f.admin, d.id, duties::UpdateDuty { due_date: Some(Some(day(3, 1))), ..Default::default() })
        .await?;
    let err = f.services.projects.update(&f.admin, p.id, shrink()).await.unwrap_err();
    assert!(matches!(&err, ServiceError::Validation(msg) if msg.contains("milestone")));

    f.services
        .milestones
        .update(&f.admin, m.id, milestones::UpdateMilestone { due_date: Some(day(4, 1)), ..Default::default() })
        .await?;
    let p = f.services.projects.update(&f.admin, p.id, shrink()).await?;
    assert_eq!(p.end_date, Some(day(6, 30)));
    Ok(())
}

#[tokio::test]
async fn deleting_project_removes_its_schedule_and_files() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Sunset").await?;
    let d = duty(&f, p.id, None).await?;
    let t = f
        .services
        .timelines
        .create(&f.admin, timelines::CreateTimeline { project_id: p.id, name: "Q1".into(), start_date: day(1, 1), end_date: day(3, 31) })
        .await?;
    let ph = f
        .services
        .phases
        .create(&f.admin, phases::CreatePhase { timeline_id: t.id, name: "Kickoff".into(), start_date: day(1, 1), end_date: day(1, 15), sort_order: None })
        .await?;
    let m = f.services.milestones.create(&f.admin, milestone_input(p.id, Some(t.id), day(2, 1))).await?;
    let doc = f.services.documents.create(&f.admin, document_input(p.id)).await?;
    let c = f.services.comments.create(&f.admin, comments::CreateComment { duty_id: d.id, content: "done soon".into() }).await?;

    f.services.projects.delete(&f.admin, p.id).await?;

    assert!(matches!(f.services.timelines.get(&f.admin, t.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.phases.get(&f.admin, ph.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.milestones.get(&f.admin, m.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.documents.get(&f.admin, doc.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.comments.get(&f.admin, c.id).await, Err(ServiceError::NotFound(_))));
    let update = f
        .services
        .timelines
        .update(&f.admin, t.id, timelines::UpdateTimeline { name: Some("Revived".into()), ..Default::default() })
        .await;
    assert!(matches!(update, Err(ServiceError::NotFound(_))));
    let listed = f.services.timelines.list(&f.admin, Default::default(), Pagination::default(), None).await?;
    assert!(listed.items.iter().all(|x| x.project_id != p.id));
    Ok(())
}

#[tokio::test]
async fn deleting_duty_removes_its_comments() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Cleanup").await?;
    let d = duty(&f, p.id, None).await?;
    let c = f.services.comments.create(&f.admin, comments::CreateComment { duty_id: d.id, content: "obsolete".into() }).await?;
    let mut input = document_input(p.id);
    input.duty_id = Some(d.id);
    let doc = f.services.documents.create(&f.admin, input).await?;

    f.services.duties.delete(&f.admin, d.id).await?;
    assert!(matches!(f.services.comments.get(&f.admin, c.id).await, Err(ServiceError::NotFound(_))));
    let doc = f.services.documents.get(&f.admin, doc.id).await?;
    assert_eq!(doc.duty_id, None);
    Ok(())
}

#[tokio::test]
async fn team_membership_round_trip() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let t = f.services.teams.create(&f.admin, teams::CreateTeam { name: "Core".into(), description: None }).await?;

    let added = f.services.teams.add_member(&f.admin, t.id, teams::AddMember { user_id: f.member.user_id }).await?;
    assert_eq!(added.user_id, f.member.user_id);
    let err = f.services.teams.add_member(&f.admin, t.id, teams::AddMember { user_id: f.member.user_id }).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(f.services.teams.members(&f.admin, t.id).await?.len(), 1);

    let inbox = f.services.notifications.list(&f.member, Default::default(), Pagination::default()).await?;
    assert!(inbox.items.iter().any(|n| n.kind == models::notification::NotificationKind::TeamJoined));

    let err = f.services.teams.remove_member(&f.admin, t.id, f.admin.user_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    f.services.teams.remove_member(&f.admin, t.id, f.member.user_id).await?;
    assert!(f.services.teams.members(&f.admin, t.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn notifications_are_private_to_their_recipient() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Inbox").await?;
    duty(&f, p.id, Some(f.member.user_id)).await?;
    duty(&f, p.id, Some(f.member.user_id)).await?;

    let inbox = f.services.notifications.list(&f.member, Default::default(), Pagination::default()).await?;
    assert_eq!(inbox.total, 2);
    let first = &inbox.items[0];

    // someone else's notification does not exist for the caller
    assert!(matches!(f.services.notifications.mark_read(&f.admin, first.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(f.services.notifications.delete(&f.admin, first.id).await, Err(ServiceError::NotFound(_))));

    let read = f.services.notifications.mark_read(&f.member, first.id).await?;
    assert!(read.is_read && read.read_at.is_some());
    assert_eq!(f.services.notifications.unread_count(&f.member).await?.unread, 1);

    let marked = f.services.notifications.mark_all_read(&f.member).await?;
    assert_eq!(marked.updated, 1);
    assert_eq!(f.services.notifications.unread_count(&f.member).await?.unread, 0);
    let unread_only = notifications::NotificationQuery { unread_only: true };
    assert_eq!(f.services.notifications.list(&f.member, unread_only, Pagination::default()).await?.total, 0);
    Ok(())
}

#[tokio::test]
async fn milestone_schedule_and_completion() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Milestones").await?;
    let other = project(&f, "Elsewhere").await?;
    let t = f
        .services
        .timelines
        .create(&f.admin, timelines::CreateTimeline { project_id: p.id, name: "H1".into(), start_date: day(1, 1), end_date: day(6, 30) })
        .await?;
    let foreign = f
        .services
        .timelines
        .create(&f.admin, timelines::CreateTimeline { project_id: other.id, name: "H1".into(), start_date: day(1, 1), end_date: day(6, 30) })
        .await?;

    let outside_timeline = f.services.milestones.create(&f.admin, milestone_input(p.id, Some(t.id), day(8, 1))).await;
    assert!(matches!(outside_timeline, Err(ServiceError::Validation(_))));
    let wrong_project = f.services.milestones.create(&f.admin, milestone_input(p.id, Some(foreign.id), day(2, 1))).await;
    assert!(matches!(wrong_project, Err(ServiceError::Validation(_))));
    let outside_project = f.services.milestones.create(&f.admin, milestone_input(p.id, None, Date::from_ymd_opt(2031, 2, 1).unwrap())).await;
    assert!(matches!(outside_project, Err(ServiceError::Validation(_))));

    let m = f.services.milestones.create(&f.admin, milestone_input(p.id, Some(t.id), day(3, 1))).await?;
    assert!(!m.is_completed);
    let m = f.services.milestones.complete(&f.admin, m.id, milestones::CompleteMilestone { completed: true }).await?;
    assert!(m.is_completed && m.completed_at.is_some());
    let m = f.services.milestones.complete(&f.admin, m.id, milestones::CompleteMilestone { completed: false }).await?;
    assert!(!m.is_completed && m.completed_at.is_none());
    Ok(())
}

#[tokio::test]
async fn only_uploader_or_project_editor_deletes_documents() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Files").await?;
    let by_admin = f.services.documents.create(&f.admin, document_input(p.id)).await?;
    let by_member = f.services.documents.create(&f.member, document_input(p.id)).await?;
    assert_eq!(by_member.uploaded_by, f.member.user_id);

    let err = f.services.documents.delete(&f.member, by_admin.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    f.services.documents.delete(&f.member, by_member.id).await?;
    f.services.documents.delete(&f.admin, by_admin.id).await?;
    Ok(())
}

#[tokio::test]
async fn teams_and_managers_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let team = f.services.teams.create(&f.admin, teams::CreateTeam { name: "Owners".into(), description: None }).await?;
    let manager = f
        .services
        .people
        .create(
            &f.admin,
            people::CreatePerson {
                kind: models::person::PersonKind::ProjectManager,
                full_name: "Grace Manager".into(),
                email: None,
                title: None,
                user_id: None,
                team_id: None,
            },
        )
        .await?;
    let p = f
        .services
        .projects
        .create(
            &f.admin,
            projects::CreateProject {
                name: "Owned".into(),
                description: None,
                team_id: Some(team.id),
                manager_id: Some(manager.id),
                start_date: None,
                end_date: None,
            },
        )
        .await?;

    assert!(matches!(f.services.teams.delete(&f.admin, team.id).await, Err(ServiceError::Validation(_))));
    assert!(matches!(f.services.people.delete(&f.admin, manager.id).await, Err(ServiceError::Validation(_))));

    f.services.projects.delete(&f.admin, p.id).await?;
    f.services.teams.delete(&f.admin, team.id).await?;
    f.services.people.delete(&f.admin, manager.id).await?;
    Ok(())
}

#[tokio::test]
async fn overdue_filter_skips_closed_and_future_duties() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = f
        .services
        .projects
        .create(
            &f.admin,
            projects::CreateProject { name: "Late".into(), description: None, team_id: None, manager_id: None, start_date: None, end_date: None },
        )
        .await?;
    let create = |title: &str, due_date: Date| duties::CreateDuty {
        project_id: p.id,
        title: title.into(),
        description: None,
        priority: None,
        assignee_id: None,
        due_date: Some(due_date),
    };
    let past = Date::from_ymd_opt(2020, 1, 1).unwrap();
    let late = f.services.duties.create(&f.admin, create("late", past)).await?;
    let dropped = f.services.duties.create(&f.admin, create("dropped", past)).await?;
    f.services.duties.create(&f.admin, create("future", day(1, 1))).await?;
    f.services
        .duties
        .change_status(&f.admin, dropped.id, duties::ChangeDutyStatus { status: DutyStatus::Cancelled })
        .await?;

    let query = duties::DutyQuery { overdue: true, ..Default::default() };
    let page = f.services.duties.list_for_parent(&f.admin, p.id, query, Pagination::default(), None).await?;
    assert_eq!(page.items.iter().map(|d| d.id).collect::<Vec<_>>(), vec![late.id]);
    Ok(())
}

#[tokio::test]
async fn mutations_leave_an_activity_trail() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let f = fixture(db).await?;
    let p = project(&f, "Audited").await?;
    f.services
        .projects
        .change_status(&f.admin, p.id, projects::ChangeProjectStatus { status: ProjectStatus::InProgress })
        .await?;

    let query = activity::ActivityQuery { entity_id: Some(p.id), ..Default::default() };
    let trail = f.services.activity.list(&f.admin, query, Pagination::default()).await?;
    let actions: Vec<_> = trail.items.iter().map(|a| a.action).collect();
    assert!(actions.contains(&models::activity_log::ActivityAction::Created));
    assert!(actions.contains(&models::activity_log::ActivityAction::StatusChanged));
    assert!(trail.items.iter().all(|a| a.entity_type == "project" && a.user_id == Some(f.admin.user_id)));
    let status_change = trail.items.iter().find(|a| a.action == models::activity_log::ActivityAction::StatusChanged);
    let details = status_change.and_then(|a| a.details.clone()).unwrap_or_default();
    assert_eq!(details["to"], "in_progress");
    Ok(())
}
