use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::activity_log::ActivityAction;
use models::document;

use super::{activity, lookup};
use crate::context::{permissions, RequestContext};
use crate::crud::{nullable, ChildListing, CrudService};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, order_by, Page, Pagination, SortSpec};

pub const SORTABLE: &[&str] = &["name", "size_bytes", "created_at"];

/// Metadata of a file stored elsewhere; only the link is kept.
#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    pub project_id: Uuid,
    pub duty_id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub duty_id: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    pub project_id: Option<Uuid>,
    pub duty_id: Option<Uuid>,
    pub name: Option<String>,
}

pub struct DocumentService {
    db: DatabaseConnection,
}

impl DocumentService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn document(&self, tenant_id: Uuid, id: Uuid) -> Result<document::Model, ServiceError> {
        document::find_in_tenant(tenant_id)
            .filter(document::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("document"))
    }

    async fn check_duty(&self, tenant_id: Uuid, project_id: Uuid, duty_id: Option<Uuid>) -> Result<(), ServiceError> {
        if let Some(did) = duty_id {
            let duty = lookup::referenced(lookup::duty(&self.db, tenant_id, did).await, "duty_id")?;
            if duty.project_id != project_id {
                return Err(ServiceError::validation("duty_id belongs to a different project"));
            }
        }
        Ok(())
    }

    /// The uploader, or anyone who may edit the project.
    fn ensure_owner(ctx: &RequestContext, doc: &document::Model) -> Result<(), ServiceError> {
        if doc.uploaded_by == ctx.user_id || ctx.has(permissions::PROJECTS_WRITE) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("only the uploader or a project editor may change this document".into()))
        }
    }

    async fn page(&self, ctx: &RequestContext, query: DocumentQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<document::Model>, ServiceError> {
        let sort = SortSpec::parse(sorting, SORTABLE, SortSpec::desc("created_at"))?;
        let mut select: Select<document::Entity> = document::find_in_tenant(ctx.tenant_id);
        if let Some(project_id) = query.project_id {
            select = select.filter(document::Column::ProjectId.eq(project_id));
        }
        if let Some(duty_id) = query.duty_id {
            select = select.filter(document::Column::DutyId.eq(duty_id));
        }
        if let Some(n) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            select = select.filter(document::Column::Name.contains(n));
        }
        let column = match sort.field.as_str() {
            "name" => document::Column::Name,
            "size_bytes" => document::Column::SizeBytes,
            _ => document::Column::CreatedAt,
        };
        fetch_page(&self.db, order_by(select, column, &sort), pagination).await
    }
}

#[async_trait]
impl CrudService for DocumentService {
    type Dto = document::Model;
    type CreateInput = CreateDocument;
    type UpdateInput = UpdateDocument;
    type ListQuery = DocumentQuery;

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, project_id = %input.project_id))]
    async fn create(&self, ctx: &RequestContext, input: CreateDocument) -> Result<document::Model, ServiceError> {
        ctx.require(permissions::DOCUMENTS_WRITE)?;
        let name = document::validate_name(&input.name)?;
        let url = document::validate_url(&input.url)?;
        let content_type = document::validate_content_type(input.content_type.as_deref())?;
        let size_bytes = document::validate_size(input.size_bytes)?;
        lookup::referenced(lookup::project(&self.db, ctx.tenant_id, input.project_id).await, "project_id")?;
        self.check_duty(ctx.tenant_id, input.project_id, input.duty_id).await?;

        let now = Utc::now();
        let created = document::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(ctx.tenant_id),
            project_id: Set(input.project_id),
            duty_id: Set(input.duty_id),
            name: Set(name),
            url: Set(url),
            content_type: Set(content_type),
            size_bytes: Set(size_bytes),
            uploaded_by: Set(ctx.user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(document_id = %created.id, size_bytes, "document_created");
        activity::record(&self.db, ctx, "document", created.id, ActivityAction::Created, None).await;
        Ok(created)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<document::Model, ServiceError> {
        ctx.require(permissions::DOCUMENTS_READ)?;
        self.document(ctx.tenant_id, id).await
    }

    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id, document_id = %id))]
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateDocument) -> Result<document::Model, ServiceError> {
        ctx.require(permissions::DOCUMENTS_WRITE)?;
        let existing = self.document(ctx.tenant_id, id).await?;
        Self::ensure_owner(ctx, &existing)?;
        let duty_id = input.duty_id.unwrap_or(existing.duty_id);
        if duty_id != existing.duty_id {
            self.check_duty(ctx.tenant_id, existing.project_id, duty_id).await?;
        }

        let mut am: document::ActiveModel = existing.into();
        if let Some(n) = input.name.as_deref() {
            am.name = Set(document::validate_name(n)?);
        }
        if let Some(u) = input.url.as_deref() {
            am.url = Set(document::validate_url(u)?);
        }
        if input.content_type.is_some() {
            am.content_type = Set(document::validate_content_type(input.content_type.as_deref())?);
        }
        if let Some(size) = input.size_bytes {
            am.size_bytes = Set(document::validate_size(size)?);
        }
        am.duty_id = Set(duty_id);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!("document_updated");
        activity::record(&self.db, ctx, "document", id, ActivityAction::Updated, None).await;
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, document_id = %id))]
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError> {
        ctx.require(permissions::DOCUMENTS_WRITE)?;
        let existing = self.document(ctx.tenant_id, id).await?;
        Self::ensure_owner(ctx, &existing)?;
        document::Entity::delete_by_id(id).exec(&self.db).await?;
        info!("document_deleted");
        activity::record(&self.db, ctx, "document", id, ActivityAction::Deleted, None).await;
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, query: DocumentQuery, pagination: Pagination, sorting: Option<&str>) -> Result<Page<document::Model>, ServiceError> {
        ctx.require(permissions::DOCUMENTS_READ)?;
        self.page(ctx, query, pagination, sorting).await
    }
}

#[async_trait]
impl ChildListing for DocumentService {
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        mut query: DocumentQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<document::Model>, ServiceError> {
        ctx.require(permissions::DOCUMENTS_READ)?;
        lookup::project(&self.db, ctx.tenant_id, parent_id).await?;
        query.project_id = Some(parent_id);
        self.page(ctx, query, pagination, sorting).await
    }
}
