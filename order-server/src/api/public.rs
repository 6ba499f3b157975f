//! Customer routes
//!
//! No identity. Tables are addressed by access token only.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::message::{CallType, StaffCall};
use shared::models::{StoreInfo, TableInfo};
use shared::order::{OrderLineInput, OrderSnapshot};

use super::{ApiResult, ok};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::tenant::TenantContext;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/public",
        Router::new()
            .route("/store", get(store_info))
            .route("/orders", post(place_order))
            .route("/orders/{id}", get(get_order))
            .route("/tables/{token}/orders", get(table_orders))
            .route("/tables/{token}/info", get(table_info))
            .route("/tables/{token}/call-staff", post(call_staff)),
    )
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub access_token: String,
    pub items: Vec<OrderLineInput>,
}

#[derive(Debug, Deserialize)]
pub struct CallStaffRequest {
    pub call_type: CallType,
}

/// GET /api/public/store
pub async fn store_info(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<StoreInfo> {
    let found = state
        .store
        .find_tenant(tenant.tenant_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;
    ok(found.store_info())
}

/// POST /api/public/orders
pub async fn place_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<OrderSnapshot> {
    let snapshot = state
        .orders
        .place_order(tenant.tenant_id, &req.access_token, &req.items)
        .await?;
    ok(snapshot)
}

/// GET /api/public/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<OrderSnapshot> {
    ok(state.orders.get_order(tenant.tenant_id, id).await?)
}

/// GET /api/public/tables/{token}/orders: active orders only
pub async fn table_orders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(token): Path<String>,
) -> ApiResult<Vec<OrderSnapshot>> {
    ok(state
        .orders
        .active_orders_for_token(tenant.tenant_id, &token)
        .await?)
}

/// GET /api/public/tables/{token}/info
pub async fn table_info(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(token): Path<String>,
) -> ApiResult<TableInfo> {
    ok(state.tables.table_info(tenant.tenant_id, &token).await?)
}

/// POST /api/public/tables/{token}/call-staff
pub async fn call_staff(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(token): Path<String>,
    Json(req): Json<CallStaffRequest>,
) -> ApiResult<StaffCall> {
    ok(state
        .tables
        .call_staff(tenant.tenant_id, &token, req.call_type)
        .await?)
}
