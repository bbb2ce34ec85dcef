//! JWT claims issued at login and verified by the HTTP middleware.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{AuthUser, Grants};
use super::errors::AuthError;
use crate::context::RequestContext;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// user email
    pub sub: String,
    pub uid: Uuid,
    pub tid: Uuid,
    pub roles: Vec<String>,
    pub perms: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &AuthUser, grants: &Grants, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.email.clone(),
            uid: user.id,
            tid: user.tenant_id,
            roles: grants.roles.clone(),
            perms: grants.permissions.clone(),
            exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn to_context(&self) -> RequestContext {
        RequestContext::new(self.tid, self.uid, self.roles.clone(), self.perms.iter().cloned())
    }
}

pub fn issue(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Signature and expiry are both checked.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), tenant_id: Uuid::new_v4(), email: "a@b.c".into(), name: "A".into(), active: true }
    }

    #[test]
    fn issued_token_verifies_and_carries_grants() {
        let grants = Grants { roles: vec!["member".into()], permissions: vec!["projects.read".into()] };
        let claims = Claims::new(&user(), &grants, 1);
        let token = issue("secret", &claims).unwrap();
        let back = verify("secret", &token).unwrap();
        assert_eq!(back, claims);
        let ctx = back.to_context();
        assert!(ctx.has("projects.read"));
        assert_eq!(ctx.tenant_id, claims.tid);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue("secret", &Claims::new(&user(), &Grants::default(), 1)).unwrap();
        assert!(matches!(verify("other", &token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(&user(), &Grants::default(), 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = issue("secret", &claims).unwrap();
        assert!(verify("secret", &token).is_err());
    }
}
