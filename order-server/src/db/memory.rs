//! In-memory store
//!
//! All maps sit behind one `RwLock`, so a `save_orders` batch is checked and
//! applied under a single write guard.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{DiningTable, MenuItem, PaymentSettings, Tenant, TenantId};
use shared::order::Order;
use std::collections::HashMap;

use super::{DataStore, OrderQuery, StorageError, StorageResult};

#[derive(Default)]
struct Inner {
    tenants: HashMap<TenantId, Tenant>,
    tables: HashMap<i64, DiningTable>,
    menu_items: HashMap<i64, MenuItem>,
    orders: HashMap<i64, Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_orders(orders: &mut [Order]) {
    orders.sort_by_key(|o| (o.created_at, o.id));
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StorageResult<Option<Tenant>> {
        let inner = self.inner.read();
        Ok(inner
            .tenants
            .values()
            .find(|t| t.subdomain == subdomain)
            .cloned())
    }

    async fn find_tenant(&self, tenant: TenantId) -> StorageResult<Option<Tenant>> {
        Ok(self.inner.read().tenants.get(&tenant).cloned())
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner
            .tenants
            .values()
            .any(|t| t.id == tenant.id || t.subdomain == tenant.subdomain)
        {
            return Err(StorageError::Duplicate(format!(
                "tenant {}",
                tenant.subdomain
            )));
        }
        inner.tenants.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn update_payment_settings(
        &self,
        tenant: TenantId,
        settings: &PaymentSettings,
    ) -> StorageResult<bool> {
        let mut inner = self.inner.write();
        match inner.tenants.get_mut(&tenant) {
            Some(t) => {
                t.apply_payment_settings(settings.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_table_by_token(
        &self,
        tenant: TenantId,
        access_token: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let inner = self.inner.read();
        Ok(inner
            .tables
            .values()
            .find(|t| t.tenant_id == tenant && t.access_token == access_token)
            .cloned())
    }

    async fn find_table(
        &self,
        tenant: TenantId,
        table_id: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let inner = self.inner.read();
        Ok(inner
            .tables
            .get(&table_id)
            .filter(|t| t.tenant_id == tenant)
            .cloned())
    }

    async fn list_tables(&self, tenant: TenantId) -> StorageResult<Vec<DiningTable>> {
        let inner = self.inner.read();
        let mut tables: Vec<DiningTable> = inner
            .tables
            .values()
            .filter(|t| t.tenant_id == tenant)
            .cloned()
            .collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tables)
    }

    async fn insert_table(&self, table: &DiningTable) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.tables.contains_key(&table.id)
            || inner
                .tables
                .values()
                .any(|t| t.access_token == table.access_token)
        {
            return Err(StorageError::Duplicate(format!("table {}", table.id)));
        }
        inner.tables.insert(table.id, table.clone());
        Ok(())
    }

    async fn update_table(&self, table: &DiningTable) -> StorageResult<bool> {
        let mut inner = self.inner.write();
        match inner
            .tables
            .get_mut(&table.id)
            .filter(|t| t.tenant_id == table.tenant_id)
        {
            Some(stored) => {
                stored.name = table.name.clone();
                stored.capacity = table.capacity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_table(&self, tenant: TenantId, table_id: i64) -> StorageResult<bool> {
        let mut inner = self.inner.write();
        let owned = inner
            .tables
            .get(&table_id)
            .is_some_and(|t| t.tenant_id == tenant);
        let referenced = inner.orders.values().any(|o| o.table_id == table_id);
        if !owned || referenced {
            return Ok(false);
        }
        inner.tables.remove(&table_id);
        Ok(true)
    }

    async fn find_menu_items(&self, tenant: TenantId, ids: &[i64]) -> StorageResult<Vec<MenuItem>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.menu_items.get(id))
            .filter(|m| m.tenant_id == tenant)
            .cloned()
            .collect())
    }

    async fn upsert_menu_item(&self, item: &MenuItem) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.menu_items.get(&item.id)
            && existing.tenant_id != item.tenant_id
        {
            return Err(StorageError::Duplicate(format!("menu item {}", item.id)));
        }
        inner.menu_items.insert(item.id, item.clone());
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.orders.contains_key(&order.id) {
            return Err(StorageError::Duplicate(format!("order {}", order.id)));
        }
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_order(&self, tenant: TenantId, order_id: i64) -> StorageResult<Option<Order>> {
        let inner = self.inner.read();
        Ok(inner
            .orders
            .get(&order_id)
            .filter(|o| o.tenant_id == tenant)
            .cloned())
    }

    async fn find_order_by_line(
        &self,
        tenant: TenantId,
        line_id: i64,
    ) -> StorageResult<Option<Order>> {
        let inner = self.inner.read();
        Ok(inner
            .orders
            .values()
            .find(|o| o.tenant_id == tenant && o.line(line_id).is_some())
            .cloned())
    }

    async fn list_orders(&self, tenant: TenantId, query: &OrderQuery) -> StorageResult<Vec<Order>> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.tenant_id == tenant && query.matches(o))
            .cloned()
            .collect();
        sort_orders(&mut orders);
        Ok(orders)
    }

    async fn save_orders(&self, tenant: TenantId, orders: &[Order]) -> StorageResult<()> {
        let mut inner = self.inner.write();

        // Check everything first so a failed batch leaves no trace
        for order in orders {
            let current = inner
                .orders
                .get(&order.id)
                .filter(|o| o.tenant_id == tenant && order.tenant_id == tenant);
            match current {
                Some(stored) if stored.version == order.version - 1 => {}
                _ => return Err(StorageError::VersionConflict { order_id: order.id }),
            }
        }

        for order in orders {
            inner.orders.insert(order.id, order.clone());
        }
        Ok(())
    }
}
