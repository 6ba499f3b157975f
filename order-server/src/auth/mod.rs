//! Staff identity
//!
//! Tokens are issued by the external login service; this module only
//! verifies them and checks that they belong to the request's tenant.

mod extractor;
mod jwt;
mod middleware;

pub use jwt::{StaffClaims, create_token, verify_token};
pub use middleware::require_role;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::TenantId;
use std::fmt;

/// Staff role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Kitchen,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Kitchen => "KITCHEN",
        })
    }
}

/// Verified identity, bound to the request's tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub tenant_id: TenantId,
    pub role: Role,
    /// Token expiry (Unix timestamp seconds)
    pub expires_at: i64,
}

impl Identity {
    /// Build an identity from verified claims, rejecting tokens of other tenants
    pub fn authorize(claims: StaffClaims, tenant: TenantId) -> Result<Self, AppError> {
        if claims.tenant_id != tenant {
            tracing::warn!(
                target: "security",
                user_id = %claims.sub,
                token_tenant = %claims.tenant_id,
                request_tenant = %tenant,
                "Token presented to another tenant"
            );
            return Err(AppError::tenant_mismatch());
        }
        Ok(Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            role: claims.role,
            expires_at: i64::try_from(claims.exp).unwrap_or(i64::MAX),
        })
    }

    /// Long-lived connections re-check this; requests are checked at decode
    pub fn is_expired(&self, now_secs: i64) -> bool {
        now_secs >= self.expires_at
    }

    /// Require one of `roles`
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            return Ok(());
        }
        let code = if roles == [Role::Admin] {
            ErrorCode::AdminRequired
        } else {
            ErrorCode::RoleRequired
        };
        let wanted: Vec<String> = roles.iter().map(Role::to_string).collect();
        Err(AppError::with_message(
            code,
            format!("Requires role {}", wanted.join(" or ")),
        )
        .with_detail("role", self.role.to_string()))
    }
}
