use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use models::project::{self, ProjectStatus};
use models::project_duty::{self, DutyStatus};
use models::{notification, team};

use super::duties::overdue_condition;
use crate::context::{permissions, RequestContext};
use crate::errors::ServiceError;

const PROJECT_STATUSES: [ProjectStatus; 5] = [
    ProjectStatus::NotStarted,
    ProjectStatus::InProgress,
    ProjectStatus::OnHold,
    ProjectStatus::Completed,
    ProjectStatus::Cancelled,
];

const DUTY_STATUSES: [DutyStatus; 5] =
    [DutyStatus::Todo, DutyStatus::InProgress, DutyStatus::InReview, DutyStatus::Done, DutyStatus::Cancelled];

/// Tenant-wide counters plus the caller's own workload.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub projects_by_status: BTreeMap<&'static str, u64>,
    pub duties_by_status: BTreeMap<&'static str, u64>,
    pub overdue_duties: u64,
    pub my_open_duties: u64,
    pub unread_notifications: u64,
    pub teams: u64,
}

pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn summary(&self, ctx: &RequestContext) -> Result<DashboardSummary, ServiceError> {
        ctx.require(permissions::PROJECTS_READ)?;
        let tid = ctx.tenant_id;

        let mut projects_by_status = BTreeMap::new();
        for status in PROJECT_STATUSES {
            let n = project::find_in_tenant(tid)
                .filter(project::Column::Status.eq(status))
                .count(&self.db)
                .await?;
            projects_by_status.insert(status.as_str(), n);
        }

        let mut duties_by_status = BTreeMap::new();
        for status in DUTY_STATUSES {
            let n = project_duty::find_in_tenant(tid)
                .filter(project_duty::Column::Status.eq(status))
                .count(&self.db)
                .await?;
            duties_by_status.insert(status.as_str(), n);
        }

        let overdue_duties = project_duty::find_in_tenant(tid)
            .filter(overdue_condition(Utc::now().date_naive()))
            .count(&self.db)
            .await?;
        let my_open_duties = project_duty::find_in_tenant(tid)
            .filter(project_duty::Column::AssigneeId.eq(ctx.user_id))
            .filter(project_duty::Column::Status.is_not_in([DutyStatus::Done, DutyStatus::Cancelled]))
            .count(&self.db)
            .await?;
        let unread_notifications = notification::find_for_user(tid, ctx.user_id)
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        let teams = team::find_in_tenant(tid).count(&self.db).await?;

        Ok(DashboardSummary {
            projects_by_status,
            duties_by_status,
            overdue_duties,
            my_open_duties,
            unread_notifications,
            teams,
        })
    }
}
