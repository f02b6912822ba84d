//! Bearer token utilities using the HS256 algorithm.
//!
//! Tokens are signed with a shared server secret and carry the user id as
//! the `sub` claim. The id is decoded into a typed value exactly once, by
//! [`extract_user_id`].

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signing secret")]
    InvalidSecret,
}

/// Token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user id rendered as a string)
    pub sub: String,
    /// Email the token was issued for
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier, logged alongside requests
    pub jti: String,
}

/// A freshly signed token together with its identifier.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: i64,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 86_400;

/// Signing configuration shared by the login flow and the auth middleware.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds
    pub token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from a shared secret.
    ///
    /// An empty secret is rejected; everything else is accepted as-is.
    pub fn new(secret: &str, token_expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a token for the given user.
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.token_expiry_secs)).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at: exp,
        })
    }

    /// Validates a token's signature and expiry and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts the user id from validated claims.
///
/// A subject that is not a positive integer makes the token invalid.
pub fn extract_user_id(claims: &Claims) -> Result<i64, JwtError> {
    match claims.sub.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(JwtError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_jwt_testing_12345";

    fn create_test_config() -> JwtConfig {
        JwtConfig::new(SECRET, DEFAULT_TOKEN_EXPIRY_SECS, 0).unwrap()
    }

    #[test]
    fn test_issue_token() {
        let config = create_test_config();
        let issued = config.issue_token(42, "alice@example.com").unwrap();

        assert!(!issued.token.is_empty());
        assert!(!issued.jti.is_empty());
        assert_eq!(issued.token.matches('.').count(), 2);
    }

    #[test]
    fn test_validate_token_roundtrip_claims() {
        let config = create_test_config();
        let issued = config.issue_token(42, "alice@example.com").unwrap();

        let claims = config.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp, issued.expires_at);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_EXPIRY_SECS);
        assert_eq!(extract_user_id(&claims).unwrap(), 42);
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();
        let a = config.issue_token(1, "a@example.com").unwrap();
        let b = config.issue_token(1, "a@example.com").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig::new(SECRET, -120, 0).unwrap();
        let issued = config.issue_token(7, "late@example.com").unwrap();

        let result = config.validate_token(&issued.token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_leeway_accepts_recently_expired_token() {
        let config = JwtConfig::new(SECRET, -5, 60).unwrap();
        let issued = config.issue_token(7, "late@example.com").unwrap();

        assert!(config.validate_token(&issued.token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = create_test_config();
        let other = JwtConfig::new("a_completely_different_secret", 3600, 0).unwrap();
        let issued = issuer.issue_token(3, "x@example.com").unwrap();

        let result = other.validate_token(&issued.token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = create_test_config();
        assert!(config.validate_token("not-a-jwt").is_err());
        assert!(config.validate_token("").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtConfig::new("", 3600, 0);
        assert!(matches!(result, Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn test_extract_user_id_rejects_bad_subject() {
        let mut claims = Claims {
            sub: "abc".to_string(),
            email: "x@example.com".to_string(),
            exp: 0,
            iat: 0,
            jti: "j".to_string(),
        };
        assert!(matches!(extract_user_id(&claims), Err(JwtError::InvalidToken)));

        claims.sub = "0".to_string();
        assert!(extract_user_id(&claims).is_err());

        claims.sub = "-4".to_string();
        assert!(extract_user_id(&claims).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = create_test_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(SECRET));
    }
}
