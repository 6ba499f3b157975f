//! HS256 staff tokens

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::TenantId;

use super::Role;

/// JWT claims issued by the login service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// User ID
    pub sub: String,
    pub tenant_id: TenantId,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Create a token (development seeding and tests; production tokens come
/// from the login service)
pub fn create_token(
    user_id: &str,
    tenant_id: TenantId,
    role: Role,
    ttl: chrono::Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = StaffClaims {
        sub: user_id.to_string(),
        tenant_id,
        role,
        exp: (now + ttl).timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry
pub fn verify_token(token: &str, secret: &str) -> Result<StaffClaims, AppError> {
    jsonwebtoken::decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip() {
        let token =
            create_token("u1", TenantId(7), Role::Kitchen, chrono::Duration::hours(1), SECRET)
                .unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.tenant_id, TenantId(7));
        assert_eq!(claims.role, Role::Kitchen);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token =
            create_token("u1", TenantId(7), Role::Admin, chrono::Duration::hours(1), SECRET)
                .unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token() {
        let token =
            create_token("u1", TenantId(7), Role::Admin, chrono::Duration::hours(-2), SECRET)
                .unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }
}
