//! Data access layer
//!
//! Every tenant-owned lookup takes the bound [`TenantId`] and filters on it;
//! a row owned by another tenant is indistinguishable from a missing row.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | default, tests, demos |
//! | [`PgStore`] | `DATABASE_URL` set |

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use shared::models::{DiningTable, MenuItem, PaymentSettings, Tenant, TenantId};
use shared::order::{Order, OrderStatus};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Optimistic concurrency check failed; the whole batch was rejected
    #[error("order {order_id} was modified concurrently")]
    VersionConflict { order_id: i64 },

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Filter for [`DataStore::list_orders`]
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub table_id: Option<i64>,
    /// `None` means every status
    pub statuses: Option<Vec<OrderStatus>>,
}

impl OrderQuery {
    pub fn for_table(table_id: i64) -> Self {
        Self {
            table_id: Some(table_id),
            statuses: None,
        }
    }

    pub fn with_statuses(mut self, statuses: &[OrderStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.table_id.is_none_or(|t| t == order.table_id)
            && self
                .statuses
                .as_ref()
                .is_none_or(|s| s.contains(&order.status))
    }
}

/// Persistence port used by the registry and the order engine.
///
/// Orders come back sorted oldest first (`created_at`, then `id`).
#[async_trait]
pub trait DataStore: Send + Sync {
    // ── Tenants ──

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StorageResult<Option<Tenant>>;
    async fn find_tenant(&self, tenant: TenantId) -> StorageResult<Option<Tenant>>;
    async fn insert_tenant(&self, tenant: &Tenant) -> StorageResult<()>;
    /// Returns `false` when the tenant does not exist
    async fn update_payment_settings(
        &self,
        tenant: TenantId,
        settings: &PaymentSettings,
    ) -> StorageResult<bool>;

    // ── Dining tables ──

    async fn find_table_by_token(
        &self,
        tenant: TenantId,
        access_token: &str,
    ) -> StorageResult<Option<DiningTable>>;
    async fn find_table(&self, tenant: TenantId, table_id: i64)
    -> StorageResult<Option<DiningTable>>;
    /// Sorted by name
    async fn list_tables(&self, tenant: TenantId) -> StorageResult<Vec<DiningTable>>;
    /// Fails with [`StorageError::Duplicate`] on a reused access token
    async fn insert_table(&self, table: &DiningTable) -> StorageResult<()>;
    /// Write name and capacity of `table` (matched on id and tenant).
    /// Returns `false` when no such table exists.
    async fn update_table(&self, table: &DiningTable) -> StorageResult<bool>;
    /// Remove a table that no order references. Returns `false` when the
    /// table is missing or still referenced.
    async fn delete_table(&self, tenant: TenantId, table_id: i64) -> StorageResult<bool>;

    // ── Menu (owned by the external menu service) ──

    /// Items of `tenant` among `ids`, soft-deleted ones included
    async fn find_menu_items(&self, tenant: TenantId, ids: &[i64])
    -> StorageResult<Vec<MenuItem>>;
    async fn upsert_menu_item(&self, item: &MenuItem) -> StorageResult<()>;

    // ── Orders ──

    async fn insert_order(&self, order: &Order) -> StorageResult<()>;
    async fn find_order(&self, tenant: TenantId, order_id: i64) -> StorageResult<Option<Order>>;
    async fn find_order_by_line(&self, tenant: TenantId, line_id: i64)
    -> StorageResult<Option<Order>>;
    async fn list_orders(&self, tenant: TenantId, query: &OrderQuery)
    -> StorageResult<Vec<Order>>;
    /// Replace each order (lines included) if its stored version is
    /// `order.version - 1`. All or nothing.
    async fn save_orders(&self, tenant: TenantId, orders: &[Order]) -> StorageResult<()>;
}
