//! Resource services. Each one owns a connection handle and scopes every
//! query to the caller's tenant.

pub mod activity;
pub mod comments;
pub mod dashboard;
pub mod documents;
pub mod duties;
mod lookup;
pub mod milestones;
pub mod notifications;
pub mod people;
pub mod phases;
pub mod projects;
pub mod roles;
pub mod teams;
pub mod tenants;
pub mod timelines;
pub mod users;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use activity::ActivityService;
pub use comments::CommentService;
pub use dashboard::DashboardService;
pub use documents::DocumentService;
pub use duties::DutyService;
pub use milestones::MilestoneService;
pub use notifications::NotificationService;
pub use people::PersonService;
pub use phases::PhaseService;
pub use projects::ProjectService;
pub use roles::RoleService;
pub use teams::TeamService;
pub use tenants::TenantService;
pub use timelines::TimelineService;
pub use users::UserService;

/// Every resource service over one shared pool.
#[derive(Clone)]
pub struct Services {
    pub tenants: Arc<TenantService>,
    pub users: Arc<UserService>,
    pub roles: Arc<RoleService>,
    pub teams: Arc<TeamService>,
    pub people: Arc<PersonService>,
    pub projects: Arc<ProjectService>,
    pub duties: Arc<DutyService>,
    pub timelines: Arc<TimelineService>,
    pub phases: Arc<PhaseService>,
    pub milestones: Arc<MilestoneService>,
    pub documents: Arc<DocumentService>,
    pub comments: Arc<CommentService>,
    pub notifications: Arc<NotificationService>,
    pub activity: Arc<ActivityService>,
    pub dashboard: Arc<DashboardService>,
}

impl Services {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            tenants: Arc::new(TenantService::new(db.clone())),
            users: Arc::new(UserService::new(db.clone())),
            roles: Arc::new(RoleService::new(db.clone())),
            teams: Arc::new(TeamService::new(db.clone())),
            people: Arc::new(PersonService::new(db.clone())),
            projects: Arc::new(ProjectService::new(db.clone())),
            duties: Arc::new(DutyService::new(db.clone())),
            timelines: Arc::new(TimelineService::new(db.clone())),
            phases: Arc::new(PhaseService::new(db.clone())),
            milestones: Arc::new(MilestoneService::new(db.clone())),
            documents: Arc::new(DocumentService::new(db.clone())),
            comments: Arc::new(CommentService::new(db.clone())),
            notifications: Arc::new(NotificationService::new(db.clone())),
            activity: Arc::new(ActivityService::new(db.clone())),
            dashboard: Arc::new(DashboardService::new(db)),
        }
    }
}

#[cfg(test)]
mod tests;
