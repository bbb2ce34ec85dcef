use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::notification::{NotificationKind, Target};
use models::{project, team, user, user_team};

use super::{activity, lookup, notifications};
use crate::context::{permissions, RequestContext};
use crate::crud::CrudService;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    /// Blank clears
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TeamMember {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub joined_at: sea_orm::prelude::DateTimeWithTimeZone,
}

pub struct TeamService {
    db: DatabaseConnection,
}

impl TeamService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Team names are unique per tenant, ignoring case and deleted teams.
    async fn ensure_unique_name(&self, tenant_id: Uuid, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut select = team::find_in_tenant(tenant_id)
            .filter(Expr::expr(Func::lower(Expr::col(team::Column::Name))).eq(name.to_lowercase()));
        if let Some(id) = except {
            select = select.filter(team::Column::Id.ne(id));
        }
        if select.count(&self.db).await? > 0 {
            return Err(ServiceError::conflict(format!("team '{name}' already exists")));
        }
        Ok(())
    }

    pub async fn members(&self, ctx: &RequestContext, team_id: Uuid) -> Result<Vec<TeamMember>, ServiceError> {
        ctx.require(permissions::TEAMS_READ)?;
        let t = lookup::team(&self.db, ctx.tenant_id, team_id).await?;
        let links = user_team::Entity::find()
            .filter(user_team::Column::TeamId.eq(t.id))
            .order_by_asc(user_team::Column::JoinedAt)
            .all(&self.db)
            .await?;
        let users = user::find_in_tenant(ctx.tenant_id)
            .filter(user::Column::Id.is_in(links.iter().map(|l| l.user_id).collect::<Vec<_>>()))
            .all(&self.db)
            .await?;
        Ok(links
            .into_iter()
            .filter_map(|l| {
                users.iter().find(|u| u.id == l.user_id).map(|u| TeamMember {
                    user_id: u.id,
                    email: u.email.clone(),
                    name: u.name.clone(),
                    joined_at: l.joined_at,
                })
            })
            .collect())
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, team_id = %team_id, user_id = %input.user_id))]
    pub async fn add_member(&self, ctx: &RequestContext, team_id: Uuid, input: AddMember) -> Result<TeamMember, ServiceError> {
        ctx.require(permissions::TEAMS_WRITE)?;
        let t = lookup::team(&self.db, ctx.tenant_id, team_id).await?;
        let u = lookup::referenced(lookup::user(&self.db, ctx.tenant_id, input.user_id).await, "user_id")?;
        if user_team::find_membership(t.id, u.id).one(&self.db).await?.is_some() {
            return Err(ServiceError::conflict(format!("{} is already a member of {}", u.email, t.name)));
        }
        let link = user_team::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            user_id: Set(u.id),
            team_id: Set(t.id),
            joined_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!("team_member_added");
        activity::record(&self.db, ctx, "team", t.id, ActivityAction::MemberAdded, Some(serde_json::json!({ "user_id": u.id }))).await;
        let target = Target { entity_type: "team", entity_id: t.id };
        notifications::notify(&self.db, ctx, u.id, NotificationKind::TeamJoined, "Added to team", &format!("You were added to team {}", t.name), Some(target)).await;
        Ok(TeamMember { user_id: u.id, email: u.email, name: u.name, joined_at: link.joined_at })
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, team_id = %team_id, user_id = %user_id))]
    pub async fn remove_member(&self, ctx: &RequestContext, team_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::TEAMS_WRITE)?;
        let t = lookup::team(&self.db, ctx.tenant_id, team_id).await?;
        let link = user_team::find_membership(t.id, user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("team member"))?;
        user_team::Entity::delete_by_id(link.id).exec(&self.db).await?;
        info!("team_member_removed");
        activity::record(&self.db, ctx, "team", t.id, ActivityAction::MemberRemoved, Some(serde_json::json!({ "user_id": user_id }))).await;
        Ok(())
    }
}

#[async_trait]
impl CrudService for TeamService {
    type Dto = team::Model;
    type CreateInput = CreateTeam;
    type UpdateInput = UpdateTeam;
    type ListQuery = TeamQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateTeam) -> Result<team::Model, ServiceError> {
        ctx.require(permissions::TEAMS_WRITE)?;
        let name = team::validate_name(&input.name)?;
        let description = team::validate_description(input.description.as_deref())?;
        self.ensure_unique_name(ctx.tenant_id, &name, None).await?;
        let now = Utc::now();
        let created = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            name: Set(name),
            description: Set(description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(team_id = %created.id, "team_created");
        activity::record(&self.db, ctx, "team", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<team::Model, ServiceError> {
        ctx.require(permissions::TEAMS_READ)?;
        lookup::team(&self.db, ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, team_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateTeam) -> Result<team::Model, ServiceError> {
        ctx.require(permissions::TEAMS_WRITE)?;
        let existing = lookup::team(&self.db, ctx.tenant_id, id).await?;
        let mut am: team::ActiveModel = existing.into();
        if let Some(name) = input.name.as_deref() {
            let name = team::validate_name(name)?;
            self.ensure_unique_name(ctx.tenant_id, &name, Some(id)).await?;
            am.name = Set(name);
        }
        if input.description.is_some() {
            am.description = Set(team::validate_description(input.description.as_deref())?);
        }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("team_updated");
        activity::record(&self.db, ctx, "team", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, team_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::TEAMS_WRITE)?;
        let existing = lookup::team(&self.db, ctx.tenant_id, id).await?;
        let owned = project::find_in_tenant(ctx.tenant_id)
            .filter(project::Column::TeamId.eq(id))
            .count(&self.db)
            .await?;
        if owned > 0 {
            return Err(ServiceError::validation(format!("team still owns {owned} project(s)")));
        }
        let now = Utc::now();
        let mut am: team::ActiveModel = existing.into();
        am.deleted_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        am.update(&self.db).await?;
        info!("team_deleted");
        activity::record(&self.db, ctx, "team", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: TeamQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<team::Model>, ServiceError> {
        ctx.require(permissions::TEAMS_READ)?;
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("name"))?;
        let mut select = team::find_in_tenant(ctx.tenant_id);
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(team::Column::Name.contains(n));
        }
        let column = match sort.field.as_str() {
            "created_at" => team::Column::CreatedAt,
            _ => team::Column::Name,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }
}
