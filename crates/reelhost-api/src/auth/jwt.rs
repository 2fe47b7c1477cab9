//! HS256 access tokens.

use crate::auth::models::JwtClaims;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reelhost_core::constants::TOKEN_ISSUER;
use reelhost_core::AppError;
use uuid::Uuid;

/// Maps a bearer token to the id of the user it was issued to.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Uuid, AppError>;
}

/// Validates tokens signed with a shared secret.
pub struct JwtIdentityResolver {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthorized("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthorized("Couldn't validate JWT".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        self.validate_token(token).map(|claims| claims.sub)
    }
}
