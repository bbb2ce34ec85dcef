//! Caller identity handed to every service operation.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::errors::ServiceError;

/// Permission names granted through roles.
pub mod permissions {
    pub const TENANT_MANAGE: &str = "tenant.manage";
    pub const USERS_MANAGE: &str = "users.manage";
    pub const ROLES_MANAGE: &str = "roles.manage";
    pub const TEAMS_READ: &str = "teams.read";
    pub const TEAMS_WRITE: &str = "teams.write";
    pub const PEOPLE_READ: &str = "people.read";
    pub const PEOPLE_WRITE: &str = "people.write";
    pub const PROJECTS_READ: &str = "projects.read";
    pub const PROJECTS_WRITE: &str = "projects.write";
    pub const DUTIES_READ: &str = "duties.read";
    pub const DUTIES_WRITE: &str = "duties.write";
    pub const TIMELINES_READ: &str = "timelines.read";
    pub const TIMELINES_WRITE: &str = "timelines.write";
    pub const DOCUMENTS_READ: &str = "documents.read";
    pub const DOCUMENTS_WRITE: &str = "documents.write";
    pub const COMMENTS_READ: &str = "comments.read";
    pub const COMMENTS_WRITE: &str = "comments.write";
    pub const COMMENTS_MANAGE: &str = "comments.manage";
    pub const ACTIVITY_READ: &str = "activity.read";

    pub const ALL: &[&str] = &[
        TENANT_MANAGE,
        USERS_MANAGE,
        ROLES_MANAGE,
        TEAMS_READ,
        TEAMS_WRITE,
        PEOPLE_READ,
        PEOPLE_WRITE,
        PROJECTS_READ,
        PROJECTS_WRITE,
        DUTIES_READ,
        DUTIES_WRITE,
        TIMELINES_READ,
        TIMELINES_WRITE,
        DOCUMENTS_READ,
        DOCUMENTS_WRITE,
        COMMENTS_READ,
        COMMENTS_WRITE,
        COMMENTS_MANAGE,
        ACTIVITY_READ,
    ];

    pub fn is_known(p: &str) -> bool { ALL.contains(&p) }

    /// Grants of the built-in `admin` role.
    pub fn admin_defaults() -> Vec<String> { ALL.iter().map(|p| p.to_string()).collect() }

    /// Grants of the built-in `member` role: every read plus day-to-day writes.
    pub fn member_defaults() -> Vec<String> {
        ALL.iter()
            .filter(|p| p.ends_with(".read") || [DUTIES_WRITE, DOCUMENTS_WRITE, COMMENTS_WRITE].contains(*p))
            .map(|p| p.to_string())
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub permissions: BTreeSet<String>,
}

impl RequestContext {
    pub fn new(tenant_id: Uuid, user_id: Uuid, roles: Vec<String>, permissions: impl IntoIterator<Item = String>) -> Self {
        Self { tenant_id, user_id, roles, permissions: permissions.into_iter().collect() }
    }

    pub fn has(&self, permission: &str) -> bool { self.permissions.contains(permission) }

    pub fn require(&self, permission: &str) -> Result<(), ServiceError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!("missing permission {permission}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_defaults_are_reads_plus_daily_writes() {
        let m = permissions::member_defaults();
        assert!(m.iter().all(|p| permissions::is_known(p)));
        assert!(m.contains(&"projects.read".to_string()));
        assert!(m.contains(&"duties.write".to_string()));
        assert!(!m.contains(&"projects.write".to_string()));
        assert!(!m.contains(&"comments.manage".to_string()));
        assert_eq!(permissions::admin_defaults().len(), permissions::ALL.len());
    }

    #[test]
    fn require_reports_forbidden() {
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![], vec!["teams.read".to_string()]);
        assert!(ctx.require("teams.read").is_ok());
        assert!(matches!(ctx.require("teams.write"), Err(ServiceError::Forbidden(_))));
    }
}
