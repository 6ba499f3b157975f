//! Table registry
//!
//! Customers only ever address a table by its access token. Raw table ids
//! appear on staff and admin views.

use shared::error::{AppError, ErrorCode};
use shared::message::{CallType, Notification, StaffCall, Topic};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, OccupancyStatus, TableInfo, TableStatus,
    TenantId,
};
use shared::order::OrderStatus;
use shared::util::{access_token, now_millis, snowflake_id};
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::{DataStore, OrderQuery, StorageError};
use crate::error::{ServiceError, ServiceResult};
use crate::live::Outbox;

const MAX_NAME_LEN: usize = 50;
const MAX_CAPACITY: i32 = 100;

#[derive(Clone)]
pub struct TableRegistry {
    store: Arc<dyn DataStore>,
    outbox: Outbox,
}

impl TableRegistry {
    pub fn new(store: Arc<dyn DataStore>, outbox: Outbox) -> Self {
        Self { store, outbox }
    }

    /// Table of `tenant` behind `access_token`
    pub async fn resolve_token(
        &self,
        tenant: TenantId,
        access_token: &str,
    ) -> ServiceResult<DiningTable> {
        self.store
            .find_table_by_token(tenant, access_token)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).into())
    }

    /// Customer summary; never includes the table id
    pub async fn table_info(&self, tenant: TenantId, access_token: &str) -> ServiceResult<TableInfo> {
        let table = self.resolve_token(tenant, access_token).await?;
        let active = self.active_tables(tenant).await?;
        Ok(TableInfo {
            status: occupancy(&active, table.id),
            name: table.name,
            capacity: table.capacity,
        })
    }

    /// Every table with its derived occupancy, recomputed on each call
    pub async fn occupancy(&self, tenant: TenantId) -> ServiceResult<Vec<TableStatus>> {
        let tables = self.store.list_tables(tenant).await?;
        let active = self.active_tables(tenant).await?;
        Ok(tables
            .into_iter()
            .map(|t| TableStatus {
                status: occupancy(&active, t.id),
                id: t.id,
                name: t.name,
                capacity: t.capacity,
                access_token: t.access_token,
            })
            .collect())
    }

    pub async fn list_tables(&self, tenant: TenantId) -> ServiceResult<Vec<DiningTable>> {
        Ok(self.store.list_tables(tenant).await?)
    }

    /// Create a table. The access token is generated here and never changes.
    pub async fn create_table(
        &self,
        tenant: TenantId,
        data: DiningTableCreate,
    ) -> ServiceResult<DiningTable> {
        let name = validate_name(&data.name)?;
        validate_capacity(data.capacity)?;

        let table = DiningTable {
            id: snowflake_id(),
            tenant_id: tenant,
            name,
            capacity: data.capacity,
            access_token: access_token(),
        };
        self.store.insert_table(&table).await.map_err(|e| match e {
            StorageError::Duplicate(key) => ServiceError::App(
                AppError::new(ErrorCode::AlreadyExists).with_detail("key", key),
            ),
            other => other.into(),
        })?;

        tracing::info!(tenant_id = %tenant, table_id = table.id, name = %table.name, "Table created");
        Ok(table)
    }

    /// Rename or resize a table. Printed QR codes stay valid.
    pub async fn update_table(
        &self,
        tenant: TenantId,
        table_id: i64,
        data: DiningTableUpdate,
    ) -> ServiceResult<DiningTable> {
        let mut table = self.find(tenant, table_id).await?;
        if let Some(name) = data.name.as_deref() {
            table.name = validate_name(name)?;
        }
        if let Some(capacity) = data.capacity {
            validate_capacity(capacity)?;
            table.capacity = capacity;
        }

        if !self.store.update_table(&table).await? {
            return Err(AppError::new(ErrorCode::TableNotFound).into());
        }
        tracing::info!(tenant_id = %tenant, table_id, name = %table.name, capacity = table.capacity, "Table updated");
        Ok(table)
    }

    /// Remove a table that has never been ordered at
    pub async fn delete_table(&self, tenant: TenantId, table_id: i64) -> ServiceResult<()> {
        let table = self.find(tenant, table_id).await?;
        let history = self
            .store
            .list_orders(tenant, &OrderQuery::for_table(table.id))
            .await?;
        if !history.is_empty() || !self.store.delete_table(tenant, table.id).await? {
            return Err(AppError::new(ErrorCode::TableHasOrders)
                .with_detail("table_id", table.id)
                .into());
        }

        tracing::info!(tenant_id = %tenant, table_id, name = %table.name, "Table deleted");
        Ok(())
    }

    /// Ask floor staff for help. Goes to the staff topic only.
    pub async fn call_staff(
        &self,
        tenant: TenantId,
        access_token: &str,
        call_type: CallType,
    ) -> ServiceResult<StaffCall> {
        let table = self.resolve_token(tenant, access_token).await?;
        let call = StaffCall {
            table_id: table.id,
            table_name: table.name,
            call_type,
            timestamp: now_millis(),
        };

        tracing::info!(tenant_id = %tenant, table_id = call.table_id, call_type = ?call_type, "Staff called");
        self.outbox
            .emit(vec![Topic::Staff(tenant)], Notification::StaffCall(call.clone()));
        Ok(call)
    }

    async fn find(&self, tenant: TenantId, table_id: i64) -> ServiceResult<DiningTable> {
        self.store
            .find_table(tenant, table_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).into())
    }

    async fn active_tables(&self, tenant: TenantId) -> Result<HashSet<i64>, ServiceError> {
        let orders = self
            .store
            .list_orders(tenant, &OrderQuery::default().with_statuses(&OrderStatus::ACTIVE))
            .await?;
        Ok(orders.iter().map(|o| o.table_id).collect())
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Table name is required")
            .with_detail("field", "name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(
            AppError::validation(format!("Table name exceeds {MAX_NAME_LEN} characters"))
                .with_detail("field", "name"),
        );
    }
    Ok(name.to_string())
}

fn validate_capacity(capacity: i32) -> Result<(), AppError> {
    if capacity <= 0 || capacity > MAX_CAPACITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Capacity must be between 1 and {MAX_CAPACITY}"),
        )
        .with_detail("field", "capacity")
        .with_detail("value", capacity));
    }
    Ok(())
}

fn occupancy(active: &HashSet<i64>, table_id: i64) -> OccupancyStatus {
    if active.contains(&table_id) {
        OccupancyStatus::Active
    } else {
        OccupancyStatus::Empty
    }
}
