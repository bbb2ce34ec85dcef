use sea_orm::{DatabaseConnection, EntityTrait, ColumnTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use models::{role, role_permission, tenant, user, user_credentials, user_role};

use crate::auth::domain::{AuthUser, Credentials, Grants, HashedPassword};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::context::permissions;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: user::Model) -> AuthUser {
    let active = u.is_active();
    AuthUser { id: u.id, tenant_id: u.tenant_id, email: u.email, name: u.name, active }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, AuthError> {
        Ok(tenant::Entity::find_by_id(tenant_id).one(&self.db).await?.is_some())
    }

    async fn create_tenant_with_admin(&self, tenant_name: &str, email: &str, name: &str, password: HashedPassword) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await?;
        if tenant::find_by_name(&txn, tenant_name).await?.is_some() {
            return Err(AuthError::Conflict(format!("tenant {tenant_name}")));
        }
        let t = tenant::create(&txn, tenant_name).await?;

        let admin = role::create(&txn, t.id, role::ADMIN, "Administrator", true, false).await?;
        role_permission::replace_for_role(&txn, admin.id, &permissions::admin_defaults()).await?;
        let member = role::create(&txn, t.id, role::MEMBER, "Member", true, true).await?;
        role_permission::replace_for_role(&txn, member.id, &permissions::member_defaults()).await?;

        let u = user::create(&txn, t.id, email, name).await?;
        user_credentials::upsert_password(&txn, u.id, password.hash, &password.algorithm).await?;
        user_role::assign(&txn, u.id, admin.id).await?;
        txn.commit().await?;
        Ok(to_auth_user(u))
    }

    async fn find_user_by_tenant_email(&self, tenant_id: Uuid, email: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(user::find_by_tenant_email(&self.db, tenant_id, email).await?.map(to_auth_user))
    }

    async fn find_user(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(user_id)
            .filter(user::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, tenant_id: Uuid, email: &str, name: &str, password: HashedPassword) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await?;
        let created = user::create(&txn, tenant_id, email, name).await?;
        user_credentials::upsert_password(&txn, created.id, password.hash, &password.algorithm).await?;
        let defaults = role::Entity::find()
            .filter(role::Column::TenantId.eq(tenant_id))
            .filter(role::Column::IsDefault.eq(true))
            .all(&txn)
            .await?;
        for r in defaults {
            user_role::assign(&txn, created.id, r.id).await?;
        }
        txn.commit().await?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn load_grants(&self, user_id: Uuid) -> Result<Grants, AuthError> {
        let roles = user_role::roles_of(&self.db, user_id).await?;
        let ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
        let permissions = role_permission::list_for_roles(&self.db, &ids).await?;
        Ok(Grants { roles: roles.into_iter().map(|r| r.name).collect(), permissions })
    }
}
