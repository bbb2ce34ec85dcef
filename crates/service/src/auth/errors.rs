use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict(_) => 1002,
            AuthError::NotFound(_) => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::InvalidToken(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<models::errors::ModelError> for AuthError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Validation(m) => AuthError::Validation(m),
            ModelError::Conflict(m) => AuthError::Conflict(m),
            ModelError::Db(m) => AuthError::Repository(m),
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(e: sea_orm::DbErr) -> Self { models::errors::ModelError::from(e).into() }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::Conflict(m) => ServiceError::Conflict(m),
            AuthError::NotFound(m) => ServiceError::not_found(&m),
            AuthError::Unauthorized => ServiceError::Unauthorized("invalid credentials".into()),
            AuthError::InvalidToken(m) => ServiceError::Unauthorized(m),
            other @ (AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_)) => {
                ServiceError::Db(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::Unauthorized.code(), 1004);
        assert_eq!(AuthError::InvalidToken("x".into()).code(), 1103);
    }

    #[test]
    fn maps_onto_service_errors() {
        assert!(matches!(ServiceError::from(AuthError::Unauthorized), ServiceError::Unauthorized(_)));
        assert!(matches!(ServiceError::from(AuthError::Conflict("t".into())), ServiceError::Conflict(_)));
        assert!(matches!(ServiceError::from(AuthError::NotFound("tenant".into())), ServiceError::NotFound(_)));
        assert!(matches!(ServiceError::from(AuthError::Repository("down".into())), ServiceError::Db(_)));
    }
}
