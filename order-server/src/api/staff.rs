//! Floor staff routes (ADMIN / STAFF)

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{PaymentSettings, TableStatus};
use shared::order::{OrderLineInput, OrderSnapshot};

use super::{ApiResult, ok};
use crate::auth::{Role, require_role};
use crate::state::AppState;
use crate::tenant::{TenantContext, settings};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/api/staff",
        Router::new()
            .route("/tables", get(occupancy))
            .route("/store/settings", get(payment_settings))
            .route("/tables/{id}/orders", get(table_orders))
            .route("/tables/{id}/pay-all", post(pay_table))
            .route("/orders/{id}/pay", post(pay_order))
            .route("/orders/{id}/surcharge", put(set_surcharge))
            .route("/orders/{id}/items", post(add_items))
            .route("/order-items/{id}", delete(cancel_line))
            .route("/order-items/{id}/quantity", put(update_quantity))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_role(&[Role::Admin, Role::Staff]),
            )),
    )
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SurchargeRequest {
    /// Missing or null clears the surcharge
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<OrderLineInput>,
}

/// GET /api/staff/store/settings: what to show at the till
pub async fn payment_settings(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<PaymentSettings> {
    ok(settings::payment_settings(state.store.as_ref(), tenant.tenant_id).await?)
}

/// GET /api/staff/tables: occupancy map
pub async fn occupancy(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<Vec<TableStatus>> {
    ok(state.tables.occupancy(tenant.tenant_id).await?)
}

/// GET /api/staff/tables/{id}/orders: every order, newest first
pub async fn table_orders(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<Vec<OrderSnapshot>> {
    ok(state.orders.orders_for_table(tenant.tenant_id, id).await?)
}

/// POST /api/staff/tables/{id}/pay-all
pub async fn pay_table(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<Vec<OrderSnapshot>> {
    ok(state.orders.pay_table(tenant.tenant_id, id).await?)
}

/// POST /api/staff/orders/{id}/pay
pub async fn pay_order(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<OrderSnapshot> {
    ok(state.orders.pay_order(tenant.tenant_id, id).await?)
}

/// PUT /api/staff/orders/{id}/surcharge
pub async fn set_surcharge(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(req): Json<SurchargeRequest>,
) -> ApiResult<OrderSnapshot> {
    ok(state
        .orders
        .apply_surcharge(tenant.tenant_id, id, req.amount, req.note)
        .await?)
}

/// POST /api/staff/orders/{id}/items
pub async fn add_items(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(req): Json<AddItemsRequest>,
) -> ApiResult<OrderSnapshot> {
    ok(state.orders.add_lines(tenant.tenant_id, id, &req.items).await?)
}

/// DELETE /api/staff/order-items/{id}
pub async fn cancel_line(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<OrderSnapshot> {
    ok(state.orders.cancel_line(tenant.tenant_id, id).await?)
}

/// PUT /api/staff/order-items/{id}/quantity
pub async fn update_quantity(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(req): Json<QuantityRequest>,
) -> ApiResult<OrderSnapshot> {
    ok(state
        .orders
        .update_line_quantity(tenant.tenant_id, id, req.quantity)
        .await?)
}
