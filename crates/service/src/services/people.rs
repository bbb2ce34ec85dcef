use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::person::{self, PersonKind};
use models::project;

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{nullable, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["full_name", "created_at"];

#[derive(Debug, Deserialize)]
pub struct CreatePerson {
    pub kind: PersonKind,
    pub full_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePerson {
    pub full_name: Option<String>,
    /// Blank clears
    pub email: Option<String>,
    /// Blank clears
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub team_id: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonQuery {
    pub kind: Option<PersonKind>,
    pub team_id: Option<Uuid>,
    pub name: Option<String>,
}

/// Directory of team members and project managers.
pub struct PersonService {
    db: DatabaseConnection,
}

impl PersonService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Referenced user and team must belong to the tenant.
    async fn check_links(&self, tenant_id: Uuid, kind: PersonKind, user_id: Option<Uuid>, team_id: Option<Uuid>) -> Result<(), ServiceError> {
        person::validate_team_for_kind(kind, team_id)?;
        if let Some(uid) = user_id {
            lookup::referenced(lookup::user(&self.db, tenant_id, uid).await, "user_id")?;
        }
        if let Some(tid) = team_id {
            lookup::referenced(lookup::team(&self.db, tenant_id, tid).await, "team_id")?;
        }
        Ok(())
    }
}

#[async_trait]
impl CrudService for PersonService {
    type Dto = person::Model;
    type CreateInput = CreatePerson;
    type UpdateInput = UpdatePerson;
    type ListQuery = PersonQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, kind = ?input.kind))]
    async fn create(&self, ctx: &RequestContext, input: CreatePerson) -> Result<person::Model, ServiceError> {
        ctx.require(permissions::PEOPLE_WRITE)?;
        let full_name = person::validate_full_name(&input.full_name)?;
        let email = person::validate_email(input.email.as_deref())?;
        let title = models::validate::optional_text("title", input.title.as_deref(), 128)?;
        self.check_links(ctx.tenant_id, input.kind, input.user_id, input.team_id).await?;

        let now = Utc::now();
        let created = person::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            kind: Set(input.kind),
            full_name: Set(full_name),
            email: Set(email),
            title: Set(title),
            user_id: Set(input.user_id),
            team_id: Set(input.team_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(person_id = %created.id, "person_created");
        activity::record(&self.db, ctx, "person", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<person::Model, ServiceError> {
        ctx.require(permissions::PEOPLE_READ)?;
        lookup::person(&self.db, ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, person_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdatePerson) -> Result<person::Model, ServiceError> {
        ctx.require(permissions::PEOPLE_WRITE)?;
        let existing = lookup::person(&self.db, ctx.tenant_id, id).await?;
        let user_id = input.user_id.unwrap_or(existing.user_id);
        let team_id = input.team_id.unwrap_or(existing.team_id);
        self.check_links(ctx.tenant_id, existing.kind, user_id, team_id).await?;

        let mut am: person::ActiveModel = existing.into();
        if let Some(n) = input.full_name.as_deref() {
            am.full_name = Set(person::validate_full_name(n)?);
        }
        if input.email.is_some() {
            am.email = Set(person::validate_email(input.email.as_deref())?);
        }
        if input.title.is_some() {
            am.title = Set(models::validate::optional_text("title", input.title.as_deref(), 128)?);
        }
        am.user_id = Set(user_id);
        am.team_id = Set(team_id);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("person_updated");
        activity::record(&self.db, ctx, "person", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, person_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::PEOPLE_WRITE)?;
        let existing = lookup::person(&self.db, ctx.tenant_id, id).await?;
        if existing.kind == PersonKind::ProjectManager {
            let managed = project::find_in_tenant(ctx.tenant_id)
                .filter(project::Column::ManagerId.eq(id))
                .count(&self.db)
                .await?;
            if managed > 0 {
                return Err(ServiceError::validation(format!("person still manages {managed} project(s)")));
            }
        }
        person::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("person_deleted");
        activity::record(&self.db, ctx, "person", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: PersonQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<person::Model>, ServiceError> {
        ctx.require(permissions::PEOPLE_READ)?;
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::asc("full_name"))?;
        let mut select = person::find_in_tenant(ctx.tenant_id);
        if let Some(kind) = query.kind {
            select = select.filter(person::Column::Kind.eq(kind));
        }
        if let Some(team_id) = query.team_id {
            select = select.filter(person::Column::TeamId.eq(team_id));
        }
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(person::Column::FullName.contains(n));
        }
        let column = match sort.field.as_str() {
            "created_at" => person::Column::CreatedAt,
            _ => person::Column::FullName,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }
}
