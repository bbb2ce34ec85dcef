use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};
use super::domain::{AuthSession, AuthUser, HashedPassword, LoginInput, MeView, RegisterInput, RegisterTenantInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::{self, Claims};
use crate::context::RequestContext;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    fn hash_password(&self, password: &str) -> Result<HashedPassword, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        Ok(HashedPassword { hash, algorithm: self.cfg.password_algorithm.clone() })
    }

    /// Create a tenant together with its first administrator.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterTenantInput;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("secret", 12));
    /// let input = RegisterTenantInput { tenant_name: "Acme".into(), email: "Owner@Acme.io".into(), name: "Owner".into(), password: "Secret123".into() };
    /// let admin = tokio_test::block_on(svc.register_tenant(input)).unwrap();
    /// assert_eq!(admin.email, "owner@acme.io");
    /// ```
    #[instrument(skip(self, input), fields(tenant_name = %input.tenant_name, email = %input.email))]
    pub async fn register_tenant(&self, input: RegisterTenantInput) -> Result<AuthUser, AuthError> {
        let tenant_name = models::tenant::validate_name(&input.tenant_name)?;
        let email = models::user::validate_email(&input.email)?;
        let name = models::user::validate_name(&input.name)?;
        let password = self.hash_password(&input.password)?;

        let admin = self.repo.create_tenant_with_admin(&tenant_name, &email, &name, password).await?;
        info!(tenant_id = %admin.tenant_id, user_id = %admin.id, "tenant_registered");
        Ok(admin)
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let tid = uuid::Uuid::new_v4();
    /// let repo = Arc::new(MockAuthRepository::with_tenant(tid));
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 12));
    /// let input = RegisterInput { tenant_id: tid, email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, tenant_id = %input.tenant_id))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = models::user::validate_email(&input.email)?;
        let name = models::user::validate_name(&input.name)?;
        if !self.repo.tenant_exists(input.tenant_id).await? {
            return Err(AuthError::NotFound("tenant".into()));
        }
        if let Some(existing) = self.repo.find_user_by_tenant_email(input.tenant_id, &email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict(format!("user {email}")));
        }

        let password = self.hash_password(&input.password)?;
        let user = self.repo.create_user(input.tenant_id, &email, &name, password).await?;
        info!(user_id = %user.id, tenant_id = %user.tenant_id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token carrying roles and permissions.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let tid = uuid::Uuid::new_v4();
    /// let repo = Arc::new(MockAuthRepository::with_tenant(tid));
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 12));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { tenant_id: tid, email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { tenant_id: tid, email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.roles.contains(&"member".to_string()));
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, tenant_id = %input.tenant_id))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_ascii_lowercase();
        let user = self.repo
            .find_user_by_tenant_email(input.tenant_id, &email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.active {
            warn!(user_id = %user.id, "login attempt for inactive user");
            return Err(AuthError::Unauthorized);
        }

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let grants = self.repo.load_grants(user.id).await?;
        let claims = Claims::new(&user, &grants, self.cfg.token_ttl_hours);
        let token = token::issue(&self.cfg.jwt_secret, &claims)?;
        info!(user_id = %user.id, tenant_id = %user.tenant_id, roles = ?grants.roles, "user_logged_in");

        Ok(AuthSession { user, token, expires_at: claims.exp, roles: grants.roles, permissions: grants.permissions })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        token::verify(&self.cfg.jwt_secret, token)
    }

    /// Verify the token and confirm its user is still active, so disabling or
    /// deleting a user revokes sessions already issued.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        match self.repo.find_user(claims.tid, claims.uid).await? {
            Some(user) if user.active => Ok(claims),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Current user with grants read fresh from storage.
    pub async fn me(&self, ctx: &RequestContext) -> Result<MeView, AuthError> {
        let user = self.repo
            .find_user(ctx.tenant_id, ctx.user_id)
            .await?
            .filter(|u| u.active)
            .ok_or(AuthError::Unauthorized)?;
        let grants = self.repo.load_grants(user.id).await?;
        Ok(MeView { user, roles: grants.roles, permissions: grants.permissions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use crate::auth::domain::RegisterInput;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(tid: Uuid) -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::with_tenant(tid));
        (repo.clone(), AuthService::new(repo, AuthConfig::new("test-secret", 1)))
    }

    fn reg(tid: Uuid, email: &str, password: &str) -> RegisterInput {
        RegisterInput { tenant_id: tid, email: email.into(), name: "Tester".into(), password: password.into() }
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let tid = Uuid::new_v4();
        let (_, svc) = svc(tid);
        let err = svc.register(reg(tid, "a@b.io", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_tenant_is_not_found() {
        let (_, svc) = svc(Uuid::new_v4());
        let err = svc.register(reg(Uuid::new_v4(), "a@b.io", "Password1")).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let tid = Uuid::new_v4();
        let (_, svc) = svc(tid);
        svc.register(reg(tid, "dup@b.io", "Password1")).await.unwrap();
        let err = svc.register(reg(tid, "DUP@b.io", "Password1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let tid = Uuid::new_v4();
        let (_, svc) = svc(tid);
        let user = svc.register(reg(tid, "me@b.io", "Password1")).await.unwrap();
        let session = svc
            .login(LoginInput { tenant_id: tid, email: "ME@b.io".into(), password: "Password1".into() })
            .await
            .unwrap();
        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.tid, tid);
        assert!(claims.perms.contains(&"duties.write".to_string()));

        let me = svc.me(&claims.to_context()).await.unwrap();
        assert_eq!(me.user.id, user.id);
        assert_eq!(me.roles, vec!["member".to_string()]);
    }

    #[tokio::test]
    async fn wrong_password_and_disabled_user_are_unauthorized() {
        let tid = Uuid::new_v4();
        let (repo, svc) = svc(tid);
        svc.register(reg(tid, "x@b.io", "Password1")).await.unwrap();
        let bad = svc.login(LoginInput { tenant_id: tid, email: "x@b.io".into(), password: "Wrong1234".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));

        repo.set_active(tid, "x@b.io", false);
        let disabled = svc.login(LoginInput { tenant_id: tid, email: "x@b.io".into(), password: "Password1".into() }).await;
        assert!(matches!(disabled, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn disabling_a_user_revokes_issued_tokens() {
        let tid = Uuid::new_v4();
        let (repo, svc) = svc(tid);
        svc.register(reg(tid, "gone@b.io", "Password1")).await.unwrap();
        let session = svc
            .login(LoginInput { tenant_id: tid, email: "gone@b.io".into(), password: "Password1".into() })
            .await
            .unwrap();
        assert!(svc.authenticate(&session.token).await.is_ok());

        repo.set_active(tid, "gone@b.io", false);
        assert!(svc.verify_token(&session.token).is_ok());
        assert!(matches!(svc.authenticate(&session.token).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn tenant_signup_grants_admin() {
        let (_, svc) = svc(Uuid::new_v4());
        let input = RegisterTenantInput { tenant_name: "Acme".into(), email: "boss@acme.io".into(), name: "Boss".into(), password: "Password1".into() };
        let admin = svc.register_tenant(input.clone()).await.unwrap();
        let session = svc
            .login(LoginInput { tenant_id: admin.tenant_id, email: "boss@acme.io".into(), password: "Password1".into() })
            .await
            .unwrap();
        assert!(session.permissions.contains(&"roles.manage".to_string()));
        assert!(matches!(svc.register_tenant(input).await, Err(AuthError::Conflict(_))));
    }
}
