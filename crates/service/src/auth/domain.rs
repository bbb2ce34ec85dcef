use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant signup input: the tenant and its first administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTenantInput {
    pub tenant_name: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub name: String,
    /// Neither disabled nor soft-deleted
    pub active: bool,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// A freshly hashed password, not yet bound to a user
#[derive(Debug, Clone)]
pub struct HashedPassword {
    pub hash: String,
    pub algorithm: String,
}

/// Role names and the union of their permissions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grants {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Current user as returned by `/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeView {
    pub user: AuthUser,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}
