//! PostgreSQL store (sqlx, runtime-checked queries)
//!
//! `save_orders` runs in one transaction; each order row is updated with a
//! `version = $expected` predicate and its lines are rewritten.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{DiningTable, MenuItem, PaymentSettings, Tenant, TenantId};
use shared::order::{Order, OrderLine, OrderStatus};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;

use super::{DataStore, OrderQuery, StorageError, StorageResult};

const MAX_CONNECTIONS: u32 = 10;

pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    tenant_id: i64,
    table_id: i64,
    status: String,
    total: Decimal,
    surcharge: Decimal,
    surcharge_note: Option<String>,
    version: i64,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    menu_item_name: String,
    quantity: i32,
    note: Option<String>,
    price_at_order: Decimal,
}

impl From<LineRow> for OrderLine {
    fn from(row: LineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            menu_item_id: row.menu_item_id,
            menu_item_name: row.menu_item_name,
            quantity: row.quantity,
            note: row.note,
            price_at_order: row.price_at_order,
        }
    }
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> StorageResult<Order> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("order {}: {e}", self.id)))?;
        Ok(Order {
            id: self.id,
            tenant_id: TenantId(self.tenant_id),
            table_id: self.table_id,
            status,
            lines,
            total: self.total,
            surcharge: self.surcharge,
            surcharge_note: self.surcharge_note,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, tenant_id, table_id, status, total, surcharge, surcharge_note, \
                             version, created_at, updated_at";

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl PgStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("PostgreSQL store ready");
        Ok(Self { pool })
    }

    /// Attach lines to order rows, preserving row order
    async fn hydrate(&self, rows: Vec<OrderRow>) -> StorageResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, menu_item_id, menu_item_name, quantity, note, price_at_order
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line.into());
        }

        rows.into_iter()
            .map(|row| {
                let lines = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }

    async fn write_lines(tx: &mut Transaction<'_, Postgres>, order: &Order) -> StorageResult<()> {
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order.id)
            .execute(&mut **tx)
            .await?;
        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, menu_item_id, menu_item_name, quantity, note, price_at_order, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(line.id)
            .bind(order.id)
            .bind(line.menu_item_id)
            .bind(&line.menu_item_name)
            .bind(line.quantity)
            .bind(&line.note)
            .bind(line.price_at_order)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StorageResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, subdomain, name, bank_id, account_no, account_name, qr_template
            FROM tenants
            WHERE subdomain = $1
            "#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn find_tenant(&self, tenant: TenantId) -> StorageResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, subdomain, name, bank_id, account_no, account_name, qr_template
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants (id, subdomain, name, bank_id, account_no, account_name, qr_template)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tenant.id.get())
        .bind(&tenant.subdomain)
        .bind(&tenant.name)
        .bind(&tenant.bank_id)
        .bind(&tenant.account_no)
        .bind(&tenant.account_name)
        .bind(&tenant.qr_template)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Duplicate(format!("tenant {}", tenant.subdomain))
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn update_payment_settings(
        &self,
        tenant: TenantId,
        settings: &PaymentSettings,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tenants SET
                bank_id = $1,
                account_no = $2,
                account_name = $3,
                qr_template = $4
            WHERE id = $5
            "#,
        )
        .bind(&settings.bank_id)
        .bind(&settings.account_no)
        .bind(&settings.account_name)
        .bind(&settings.qr_template)
        .bind(tenant.get())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_table_by_token(
        &self,
        tenant: TenantId,
        access_token: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, tenant_id, name, capacity, access_token
            FROM dining_tables
            WHERE tenant_id = $1 AND access_token = $2
            "#,
        )
        .bind(tenant.get())
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(table)
    }

    async fn find_table(
        &self,
        tenant: TenantId,
        table_id: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, tenant_id, name, capacity, access_token
            FROM dining_tables
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant.get())
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(table)
    }

    async fn list_tables(&self, tenant: TenantId) -> StorageResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, tenant_id, name, capacity, access_token
            FROM dining_tables
            WHERE tenant_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(tenant.get())
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    async fn insert_table(&self, table: &DiningTable) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, tenant_id, name, capacity, access_token)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(table.id)
        .bind(table.tenant_id.get())
        .bind(&table.name)
        .bind(table.capacity)
        .bind(&table.access_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Duplicate(format!("table {}", table.id))
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn update_table(&self, table: &DiningTable) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE dining_tables SET name = $1, capacity = $2 WHERE tenant_id = $3 AND id = $4",
        )
        .bind(&table.name)
        .bind(table.capacity)
        .bind(table.tenant_id.get())
        .bind(table.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_table(&self, tenant: TenantId, table_id: i64) -> StorageResult<bool> {
        // tables with order history stay
        let result = sqlx::query(
            r#"
            DELETE FROM dining_tables
            WHERE tenant_id = $1 AND id = $2
              AND NOT EXISTS (SELECT 1 FROM orders WHERE table_id = $2)
            "#,
        )
        .bind(tenant.get())
        .bind(table_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_menu_items(&self, tenant: TenantId, ids: &[i64]) -> StorageResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, tenant_id, category_id, name, price, out_of_stock, is_deleted
            FROM menu_items
            WHERE tenant_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(tenant.get())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn upsert_menu_item(&self, item: &MenuItem) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO menu_items (id, tenant_id, category_id, name, price, out_of_stock, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                category_id = EXCLUDED.category_id, name = EXCLUDED.name,
                price = EXCLUDED.price, out_of_stock = EXCLUDED.out_of_stock,
                is_deleted = EXCLUDED.is_deleted
            WHERE menu_items.tenant_id = EXCLUDED.tenant_id
            "#,
        )
        .bind(item.id)
        .bind(item.tenant_id.get())
        .bind(item.category_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.out_of_stock)
        .bind(item.is_deleted)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Duplicate(format!("menu item {}", item.id)));
        }
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, table_id, status, total, surcharge, surcharge_note,
                version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(order.tenant_id.get())
        .bind(order.table_id)
        .bind(order.status.as_str())
        .bind(order.total)
        .bind(order.surcharge)
        .bind(&order.surcharge_note)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;
        Self::write_lines(&mut tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_order(&self, tenant: TenantId, order_id: i64) -> StorageResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant.get())
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_order_by_line(
        &self,
        tenant: TenantId,
        line_id: i64,
    ) -> StorageResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o \
             WHERE o.tenant_id = $1 \
               AND o.id = (SELECT order_id FROM order_lines WHERE id = $2)"
        ))
        .bind(tenant.get())
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn list_orders(&self, tenant: TenantId, query: &OrderQuery) -> StorageResult<Vec<Order>> {
        let statuses: Option<Vec<String>> = query
            .statuses
            .as_ref()
            .map(|s| s.iter().map(|st| st.as_str().to_string()).collect());
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE tenant_id = $1 \
               AND ($2::BIGINT IS NULL OR table_id = $2) \
               AND ($3::TEXT[] IS NULL OR status = ANY($3)) \
             ORDER BY created_at, id"
        ))
        .bind(tenant.get())
        .bind(query.table_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn save_orders(&self, tenant: TenantId, orders: &[Order]) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        for order in orders {
            let result = sqlx::query(
                r#"
                UPDATE orders
                SET status = $1, total = $2, surcharge = $3, surcharge_note = $4,
                    version = $5, updated_at = $6
                WHERE id = $7 AND tenant_id = $8 AND version = $9
                "#,
            )
            .bind(order.status.as_str())
            .bind(order.total)
            .bind(order.surcharge)
            .bind(&order.surcharge_note)
            .bind(order.version)
            .bind(order.updated_at)
            .bind(order.id)
            .bind(tenant.get())
            .bind(order.version - 1)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                // Dropping the transaction rolls back earlier rows of the batch
                return Err(StorageError::VersionConflict { order_id: order.id });
            }
            Self::write_lines(&mut tx, order).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
