//! Authentication service for user registration and login.

use std::sync::Arc;

use domain::models::user::{LoginResponse, SignupRequest};
use domain::models::{NewUser, UserSummary};
use domain::{PlannerStore, StoreError};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_against_dummy, verify_password, PasswordError};
use shared::validation::normalize_email;
use thiserror::Error;
use tracing::info;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthError::EmailAlreadyExists,
            other => AuthError::Store(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::Store(e) => ApiError::Internal(format!("Store error: {}", e)),
        }
    }
}

/// Registers users and exchanges credentials for bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn PlannerStore>,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(store: Arc<dyn PlannerStore>, jwt: Arc<JwtConfig>) -> Self {
        Self { store, jwt }
    }

    /// Registers a new user.
    ///
    /// The existence check is a fast path only; the store's unique email
    /// constraint decides concurrent registrations.
    pub async fn register(&self, request: SignupRequest) -> Result<UserSummary, AuthError> {
        let email = normalize_email(&request.email);

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .store
            .insert_user(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user.summary())
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown emails are checked against a dummy hash so both failure
    /// paths cost the same.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            verify_against_dummy(password)?;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt.issue_token(user.id, &user.email)?;
        info!(user_id = user.id, jti = %issued.jti, "User logged in");

        Ok(LoginResponse {
            token: issued.token,
            user: user.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryStore;

    fn service() -> AuthService {
        let jwt = JwtConfig::new("auth-service-test-secret", 3600, 30).unwrap();
        AuthService::new(Arc::new(MemoryStore::new()), Arc::new(jwt))
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Alice Example".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = service();
        let user = service.register(signup("  Alice@Example.COM ")).await.unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice Example");
        assert!(user.id > 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = service();
        service.register(signup("alice@example.com")).await.unwrap();

        let result = service.register(signup("ALICE@example.com")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_registered_user() {
        let service = service();
        let registered = service.register(signup("alice@example.com")).await.unwrap();

        let response = service.login("Alice@Example.com", "secret123").await.unwrap();

        assert_eq!(response.user, registered);
        let claims = service.jwt.validate_token(&response.token).unwrap();
        assert_eq!(claims.sub, registered.id.to_string());
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.register(signup("alice@example.com")).await.unwrap();

        let wrong_password = service.login("alice@example.com", "not-the-password").await;
        let unknown_email = service.login("nobody@example.com", "secret123").await;

        let wrong_password = wrong_password.unwrap_err();
        let unknown_email = unknown_email.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn test_auth_error_status_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::EmailAlreadyExists),
            ApiError::Conflict(msg) if msg == "email already registered"
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::Store(StoreError::Backend("down".into()))),
            ApiError::Internal(_)
        ));
    }
}
