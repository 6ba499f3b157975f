//! Kitchen display routes (ADMIN / KITCHEN)

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use shared::order::{OrderSnapshot, OrderStatus};

use super::{ApiResult, ok};
use crate::auth::{Identity, Role, require_role};
use crate::state::AppState;
use crate::tenant::TenantContext;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/api/kitchen",
        Router::new()
            .route("/orders", get(queue))
            .route("/orders/{id}/status", post(set_status))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_role(&[Role::Admin, Role::Kitchen]),
            )),
    )
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// GET /api/kitchen/orders: PENDING and PREPARING, oldest first
pub async fn queue(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<Vec<OrderSnapshot>> {
    ok(state.orders.kitchen_queue(tenant.tenant_id).await?)
}

/// POST /api/kitchen/orders/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<OrderSnapshot> {
    ok(state
        .orders
        .set_status(identity.tenant_id, id, req.status, identity.role)
        .await?)
}
