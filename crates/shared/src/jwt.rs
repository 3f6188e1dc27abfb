//! JWT validation for the tenant/auth context.
//!
//! Tokens are minted by the identity service. This service verifies them and
//! reads the acting principal and tenant out of the claims.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtConfig;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Signs a short-lived token for the given principal.
    ///
    /// Used by operational tooling and tests; production tokens come from the
    /// identity service.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn sign(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        role: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, org_id, role, Utc::now() + ttl);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or forged.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: secret.to_string(),
        })
    }

    #[test]
    fn test_sign_and_validate() {
        let service = create_test_service("test-secret-key-for-testing");
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        let token = service
            .sign(user_id, org_id, "accountant", Duration::minutes(15))
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().into_inner(), user_id);
        assert_eq!(claims.organization_id().into_inner(), org_id);
        assert_eq!(claims.role, "accountant");
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service("test-secret-key-for-testing");
        let token = service
            .sign(Uuid::new_v4(), Uuid::new_v4(), "admin", Duration::hours(-2))
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = create_test_service("issuer-secret");
        let verifier = create_test_service("different-secret");
        let token = issuer
            .sign(Uuid::new_v4(), Uuid::new_v4(), "admin", Duration::minutes(5))
            .unwrap();

        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service("test-secret-key-for-testing");
        assert!(service.validate_token("invalid.token.here").is_err());
    }
}
