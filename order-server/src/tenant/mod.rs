//! Tenant resolver
//!
//! Binds each request to exactly one tenant, derived from the host name:
//!
//! ```text
//! pho24.example.com:8080  →  "pho24"
//! 192.168.1.20:8080       →  fallback ("default")
//! localhost               →  fallback
//! ```
//!
//! The binding is a [`TenantContext`] request extension: it lives and dies
//! with the request, so nothing can observe it from another request.

pub mod settings;

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::TenantId;
use tracing::Instrument;

use crate::error::ServiceError;
use crate::state::AppState;

/// Tenant bound to the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub subdomain: String,
}

/// Strip `:port` and IPv6 brackets, lowercase.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let bare = if let Some(rest) = host.strip_prefix('[') {
        // [::1]:8080
        rest.split(']').next().unwrap_or(rest)
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(host)
    } else {
        host
    };
    bare.trim_end_matches('.').to_ascii_lowercase()
}

fn is_ipv4_literal(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Tenant key for a host: the label before the first dot.
///
/// IP literals and dotless hosts map to `fallback`.
pub fn tenant_key(host: &str, fallback: &str) -> String {
    let host = normalize_host(host);
    if host.is_empty() || is_ipv4_literal(&host) {
        return fallback.to_string();
    }
    match host.split_once('.') {
        Some((label, _)) if !label.is_empty() => label.to_string(),
        _ => fallback.to_string(),
    }
}

fn request_host(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
}

/// Middleware: resolve the tenant before any handler or extractor runs.
///
/// Unknown tenants are answered with 404 `TenantNotFound` right here.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = tenant_key(request_host(&request).unwrap_or_default(), &state.fallback_tenant);

    let tenant = state
        .store
        .find_tenant_by_subdomain(&key)
        .await
        .map_err(|e| AppError::from(ServiceError::from(e)))?
        .ok_or_else(|| {
            tracing::debug!(subdomain = %key, "Unknown tenant");
            AppError::with_message(ErrorCode::TenantNotFound, format!("Unknown store: {key}"))
        })?;

    let span = tracing::info_span!("tenant", tenant_id = %tenant.id, subdomain = %key);
    request.extensions_mut().insert(TenantContext {
        tenant_id: tenant.id,
        subdomain: key,
    });

    Ok(next.run(request).instrument(span).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().cloned().ok_or_else(|| {
            tracing::error!(uri = %parts.uri, "Route reached without tenant binding");
            AppError::new(ErrorCode::InternalError)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_port_and_case() {
        assert_eq!(normalize_host("Pho24.Example.com:8080"), "pho24.example.com");
        assert_eq!(normalize_host("[::1]:8080"), "::1");
        assert_eq!(normalize_host("localhost"), "localhost");
        assert_eq!(normalize_host("a.example.com."), "a.example.com");
    }

    #[test]
    fn subdomain_is_first_label() {
        assert_eq!(tenant_key("pho24.example.com", "default"), "pho24");
        assert_eq!(tenant_key("PHO24.example.com:443", "default"), "pho24");
        assert_eq!(tenant_key("a.b.c.d.example.com", "default"), "a");
    }

    #[test]
    fn ip_and_dotless_hosts_use_fallback() {
        assert_eq!(tenant_key("192.168.1.20", "default"), "default");
        assert_eq!(tenant_key("192.168.1.20:8080", "default"), "default");
        assert_eq!(tenant_key("localhost:8080", "default"), "default");
        assert_eq!(tenant_key("[::1]:8080", "default"), "default");
        assert_eq!(tenant_key("", "main"), "main");
    }

    #[test]
    fn numeric_looking_names_are_not_ips() {
        assert_eq!(tenant_key("1.2.3.example.com", "default"), "1");
        assert_eq!(tenant_key("1.2.3", "default"), "1");
    }
}
