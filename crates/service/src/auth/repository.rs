use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, Grants, HashedPassword};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, AuthError>;

    /// Atomically create a tenant, its built-in roles and an admin user.
    /// A taken tenant name is a `Conflict`.
    async fn create_tenant_with_admin(
        &self,
        tenant_name: &str,
        email: &str,
        name: &str,
        password: HashedPassword,
    ) -> Result<AuthUser, AuthError>;

    async fn find_user_by_tenant_email(&self, tenant_id: Uuid, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<AuthUser>, AuthError>;

    /// Create a user with credentials and every default role of the tenant.
    async fn create_user(&self, tenant_id: Uuid, email: &str, name: &str, password: HashedPassword) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn load_grants(&self, user_id: Uuid) -> Result<Grants, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::context::permissions;
    use models::role;

    #[derive(Default)]
    pub struct MockAuthRepository {
        tenants: Mutex<HashMap<Uuid, String>>,
        users: Mutex<HashMap<(Uuid, String), AuthUser>>, // key: (tenant_id, email)
        creds: Mutex<HashMap<Uuid, Credentials>>,        // key: user_id
        grants: Mutex<HashMap<Uuid, Grants>>,            // key: user_id
    }

    impl MockAuthRepository {
        /// Repository that already knows `tenant_id`.
        pub fn with_tenant(tenant_id: Uuid) -> Self {
            let repo = Self::default();
            repo.tenants.lock().unwrap().insert(tenant_id, format!("tenant-{tenant_id}"));
            repo
        }

        pub fn set_active(&self, tenant_id: Uuid, email: &str, active: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&(tenant_id, email.to_string())) {
                u.active = active;
            }
        }

        fn insert_user(&self, tenant_id: Uuid, email: &str, name: &str, password: HashedPassword, grants: Grants) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&(tenant_id, email.to_string())) {
                return Err(AuthError::Conflict(format!("user {email}")));
            }
            let user = AuthUser { id: Uuid::new_v4(), tenant_id, email: email.to_string(), name: name.to_string(), active: true };
            users.insert((tenant_id, email.to_string()), user.clone());
            self.creds.lock().unwrap().insert(
                user.id,
                Credentials { user_id: user.id, password_hash: password.hash, password_algorithm: password.algorithm },
            );
            self.grants.lock().unwrap().insert(user.id, grants);
            Ok(user)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, AuthError> {
            Ok(self.tenants.lock().unwrap().contains_key(&tenant_id))
        }

        async fn create_tenant_with_admin(&self, tenant_name: &str, email: &str, name: &str, password: HashedPassword) -> Result<AuthUser, AuthError> {
            let tenant_id = {
                let mut tenants = self.tenants.lock().unwrap();
                if tenants.values().any(|n| n == tenant_name) {
                    return Err(AuthError::Conflict(format!("tenant {tenant_name}")));
                }
                let id = Uuid::new_v4();
                tenants.insert(id, tenant_name.to_string());
                id
            };
            let grants = Grants { roles: vec![role::ADMIN.to_string()], permissions: permissions::admin_defaults() };
            self.insert_user(tenant_id, email, name, password, grants)
        }

        async fn find_user_by_tenant_email(&self, tenant_id: Uuid, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&(tenant_id, email.to_string())).cloned())
        }

        async fn find_user(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.tenant_id == tenant_id && u.id == user_id).cloned())
        }

        async fn create_user(&self, tenant_id: Uuid, email: &str, name: &str, password: HashedPassword) -> Result<AuthUser, AuthError> {
            let grants = Grants { roles: vec![role::MEMBER.to_string()], permissions: permissions::member_defaults() };
            self.insert_user(tenant_id, email, name, password, grants)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn load_grants(&self, user_id: Uuid) -> Result<Grants, AuthError> {
            Ok(self.grants.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
        }
    }
}
