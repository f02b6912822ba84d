//! Bearer token authentication middleware.
//!
//! Validates the `Authorization: Bearer <token>` header on protected routes
//! and stores the caller's identity in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::UserId;
use shared::jwt::{extract_user_id, JwtConfig, JwtError};

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller, decoded once from the bearer token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: UserId,
    /// Token identifier, recorded in logs.
    pub jti: String,
}

impl UserAuth {
    /// Validates a token and returns the identity it carries.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, JwtError> {
        let claims = jwt.validate_token(token)?;
        let user_id = extract_user_id(&claims)?;
        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }

    /// Authenticates a request from its headers.
    pub fn from_headers(jwt: &JwtConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = bearer_token(headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        Self::validate(jwt, token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that rejects requests without a valid bearer token.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.jwt, req.headers()) {
        Ok(auth) => {
            tracing::debug!(user_id = auth.user_id, jti = %auth.jti, "Request authenticated");
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "middleware-test-secret";

    fn jwt() -> JwtConfig {
        JwtConfig::new(SECRET, 3600, 30).unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_token_yields_user_id() {
        let jwt = jwt();
        let issued = jwt.issue_token(42, "alice@example.com").unwrap();

        let auth = UserAuth::from_headers(&jwt, &headers_with(&format!("Bearer {}", issued.token)))
            .unwrap();

        assert_eq!(auth.user_id, 42);
        assert_eq!(auth.jti, issued.jti);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let result = UserAuth::from_headers(&jwt(), &HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthorized() {
        let result = UserAuth::from_headers(&jwt(), &headers_with("Basic YWxpY2U6c2VjcmV0"));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_unauthorized() {
        let other = JwtConfig::new("some-other-secret", 3600, 30).unwrap();
        let issued = other.issue_token(7, "bob@example.com").unwrap();

        let result = UserAuth::from_headers(&jwt(), &headers_with(&format!("Bearer {}", issued.token)));
        assert!(matches!(result, Err(ApiError::Unauthorized(msg)) if msg == "Invalid or expired token"));
    }

    #[test]
    fn test_bearer_token_trims_whitespace() {
        let headers = headers_with("Bearer   abc.def.ghi ");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }
}
