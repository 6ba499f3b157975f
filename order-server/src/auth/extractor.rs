//! Identity extractor
//!
//! Protected handlers take [`Identity`] as an argument; the bearer token is
//! verified and matched against the tenant bound by the resolver.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::{Identity, verify_token};
use crate::state::AppState;
use crate::tenant::TenantContext;

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let tenant = TenantContext::from_request_parts(parts, state).await?;

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let token = match header {
            Some(h) => h
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                tracing::debug!(target: "security", uri = %parts.uri, "Missing bearer token");
                return Err(AppError::not_authenticated());
            }
        };

        let claims = verify_token(token, &state.jwt_secret)?;
        let identity = Identity::authorize(claims, tenant.tenant_id)?;

        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}
