//! HTTP and WebSocket routes
//!
//! | Prefix | Guard |
//! |--------|-------|
//! | `/api/public` | none (table access token where needed) |
//! | `/api/kitchen` | ADMIN / KITCHEN |
//! | `/api/staff` | ADMIN / STAFF |
//! | `/api/admin` | ADMIN |
//! | `/ws` | optional `?token=` |
//! | `/health` | none, no tenant |
//!
//! Everything except `/health` is bound to a tenant by [`resolve_tenant`]
//! before any guard or handler runs.

pub mod admin;
pub mod health;
pub mod kitchen;
pub mod public;
pub mod staff;
pub mod ws;

use axum::routing::get;
use axum::{Json, Router, middleware};
use shared::error::{ApiResponse, AppError};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::tenant::resolve_tenant;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let tenant_scoped = Router::new()
        .merge(public::router())
        .merge(kitchen::router(&state))
        .merge(staff::router(&state))
        .merge(admin::router(&state))
        .route("/ws", get(ws::handle_ws))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_tenant));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(tenant_scoped)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
