//! Admin routes

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router, middleware};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, PaymentSettings};

use super::{ApiResult, ok};
use crate::auth::{Identity, Role, require_role};
use crate::state::AppState;
use crate::tenant::{TenantContext, settings};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/api/admin",
        Router::new()
            .route("/tables", get(list_tables).post(create_table))
            .route("/tables/{id}", put(update_table).delete(delete_table))
            .route(
                "/store/settings",
                get(payment_settings).put(update_payment_settings),
            )
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_role(&[Role::Admin]),
            )),
    )
}

/// GET /api/admin/tables: with access tokens, for QR printing
pub async fn list_tables(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<Vec<DiningTable>> {
    ok(state.tables.list_tables(tenant.tenant_id).await?)
}

/// POST /api/admin/tables
pub async fn create_table(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<DiningTableCreate>,
) -> ApiResult<DiningTable> {
    ok(state.tables.create_table(identity.tenant_id, data).await?)
}

/// PUT /api/admin/tables/{id}: name and capacity only
pub async fn update_table(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(data): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    ok(state.tables.update_table(identity.tenant_id, id, data).await?)
}

/// DELETE /api/admin/tables/{id}
pub async fn delete_table(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    state.tables.delete_table(identity.tenant_id, id).await?;
    ok(true)
}

pub async fn payment_settings(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> ApiResult<PaymentSettings> {
    ok(settings::payment_settings(state.store.as_ref(), tenant.tenant_id).await?)
}

/// PUT /api/admin/store/settings: replaces every field
pub async fn update_payment_settings(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<PaymentSettings>,
) -> ApiResult<PaymentSettings> {
    ok(settings::update_payment_settings(state.store.as_ref(), identity.tenant_id, data).await?)
}
