use rust_decimal::Decimal;
use shared::message::{Notification, Topic};
use shared::models::{DiningTable, TenantId};
use shared::order::{Order, OrderLine, OrderLineInput, OrderSnapshot, OrderStatus};
use shared::util::{now_millis, snowflake_id};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::money;
use super::{OrderError, OrderResult};
use crate::auth::Role;
use crate::db::{DataStore, OrderQuery};
use crate::live::Outbox;

/// Which screens hear about a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    KitchenAndTable,
    /// Surcharges are not shown on kitchen displays
    TableOnly,
}

/// Owns the order aggregate. Every operation takes the bound tenant first.
#[derive(Clone)]
pub struct OrderEngine {
    store: Arc<dyn DataStore>,
    outbox: Outbox,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn DataStore>, outbox: Outbox) -> Self {
        Self { store, outbox }
    }

    // ========== Queries ==========

    pub async fn get_order(&self, tenant: TenantId, order_id: i64) -> OrderResult<OrderSnapshot> {
        let order = self.load(tenant, order_id).await?;
        let table_name = self.table_name(tenant, order.table_id).await?;
        Ok(OrderSnapshot::new(&order, table_name))
    }

    /// Customer view: active orders of the table behind `access_token`
    pub async fn active_orders_for_token(
        &self,
        tenant: TenantId,
        access_token: &str,
    ) -> OrderResult<Vec<OrderSnapshot>> {
        let table = self.table_by_token(tenant, access_token).await?;
        let orders = self
            .store
            .list_orders(
                tenant,
                &OrderQuery::for_table(table.id).with_statuses(&OrderStatus::ACTIVE),
            )
            .await?;
        Ok(orders
            .iter()
            .map(|o| OrderSnapshot::new(o, &table.name))
            .collect())
    }

    /// Staff view: every order of a table, newest first
    pub async fn orders_for_table(
        &self,
        tenant: TenantId,
        table_id: i64,
    ) -> OrderResult<Vec<OrderSnapshot>> {
        let table = self
            .store
            .find_table(tenant, table_id)
            .await?
            .ok_or(OrderError::TableNotFound)?;
        let orders = self
            .store
            .list_orders(tenant, &OrderQuery::for_table(table.id))
            .await?;
        Ok(orders
            .iter()
            .rev()
            .map(|o| OrderSnapshot::new(o, &table.name))
            .collect())
    }

    /// PENDING and PREPARING orders, oldest first
    pub async fn kitchen_queue(&self, tenant: TenantId) -> OrderResult<Vec<OrderSnapshot>> {
        let orders = self
            .store
            .list_orders(
                tenant,
                &OrderQuery::default().with_statuses(&OrderStatus::KITCHEN_QUEUE),
            )
            .await?;
        self.snapshots(tenant, &orders).await
    }

    // ========== Commands ==========

    /// Place a new PENDING order on the table behind `access_token`
    pub async fn place_order(
        &self,
        tenant: TenantId,
        access_token: &str,
        lines: &[OrderLineInput],
    ) -> OrderResult<OrderSnapshot> {
        money::validate_lines(lines)?;
        let table = self.table_by_token(tenant, access_token).await?;

        let now = now_millis();
        let order_id = snowflake_id();
        let mut order = Order {
            id: order_id,
            tenant_id: tenant,
            table_id: table.id,
            status: OrderStatus::Pending,
            lines: self.price_lines(tenant, order_id, lines).await?,
            total: Decimal::ZERO,
            surcharge: Decimal::ZERO,
            surcharge_note: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        order.recompute_total();

        self.store.insert_order(&order).await?;
        tracing::info!(
            tenant_id = %tenant,
            order_id = order.id,
            table_id = table.id,
            lines = order.lines.len(),
            total = %order.total,
            "Order placed"
        );

        let snapshot = OrderSnapshot::new(&order, &table.name);
        self.publish(&snapshot, Audience::KitchenAndTable);
        Ok(snapshot)
    }

    pub async fn set_status(
        &self,
        tenant: TenantId,
        order_id: i64,
        status: OrderStatus,
        actor: Role,
    ) -> OrderResult<OrderSnapshot> {
        let mut order = self.load(tenant, order_id).await?;
        let from = order.status;
        if !from.can_transition_to(status) {
            return Err(OrderError::InvalidTransition { from, to: status });
        }
        order.status = status;

        let snapshot = self.commit(tenant, order, Audience::KitchenAndTable).await?;
        tracing::info!(tenant_id = %tenant, order_id, %from, to = %status, %actor, "Order status changed");
        Ok(snapshot)
    }

    /// Remove one line. An order left without lines is cancelled.
    pub async fn cancel_line(&self, tenant: TenantId, line_id: i64) -> OrderResult<OrderSnapshot> {
        let mut order = self
            .store
            .find_order_by_line(tenant, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?;
        if !order.status.lines_cancellable() {
            return Err(OrderError::NotEditable {
                order_id: order.id,
                status: order.status,
            });
        }

        order.lines.retain(|l| l.id != line_id);
        order.recompute_total();
        if order.lines.is_empty() {
            order.status = OrderStatus::Cancelled;
            tracing::info!(tenant_id = %tenant, order_id = order.id, "Last line removed, order cancelled");
        }

        self.commit(tenant, order, Audience::KitchenAndTable).await
    }

    pub async fn update_line_quantity(
        &self,
        tenant: TenantId,
        line_id: i64,
        quantity: i32,
    ) -> OrderResult<OrderSnapshot> {
        money::validate_quantity(quantity)?;
        let mut order = self
            .store
            .find_order_by_line(tenant, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?;
        ensure_editable(&order)?;

        let line = order
            .line_mut(line_id)
            .ok_or(OrderError::LineNotFound(line_id))?;
        line.quantity = quantity;
        order.recompute_total();

        self.commit(tenant, order, Audience::KitchenAndTable).await
    }

    /// Append lines with prices frozen now
    pub async fn add_lines(
        &self,
        tenant: TenantId,
        order_id: i64,
        lines: &[OrderLineInput],
    ) -> OrderResult<OrderSnapshot> {
        money::validate_lines(lines)?;
        let mut order = self.load(tenant, order_id).await?;
        ensure_editable(&order)?;

        let new_lines = self.price_lines(tenant, order.id, lines).await?;
        order.lines.extend(new_lines);
        order.recompute_total();

        self.commit(tenant, order, Audience::KitchenAndTable).await
    }

    /// Overwrite the surcharge; a missing amount clears it
    pub async fn apply_surcharge(
        &self,
        tenant: TenantId,
        order_id: i64,
        amount: Option<Decimal>,
        note: Option<String>,
    ) -> OrderResult<OrderSnapshot> {
        let amount = amount.unwrap_or(Decimal::ZERO);
        money::validate_surcharge(amount, note.as_deref())?;
        let mut order = self.load(tenant, order_id).await?;
        ensure_editable(&order)?;

        order.surcharge = amount;
        order.surcharge_note = note.filter(|n| !n.trim().is_empty());

        self.commit(tenant, order, Audience::TableOnly).await
    }

    pub async fn pay_order(&self, tenant: TenantId, order_id: i64) -> OrderResult<OrderSnapshot> {
        let mut order = self.load(tenant, order_id).await?;
        match order.status {
            OrderStatus::Paid => return Err(OrderError::AlreadyPaid(order.id)),
            from if !from.is_active() => {
                return Err(OrderError::InvalidTransition {
                    from,
                    to: OrderStatus::Paid,
                });
            }
            _ => {}
        }
        order.status = OrderStatus::Paid;

        let snapshot = self.commit(tenant, order, Audience::KitchenAndTable).await?;
        tracing::info!(tenant_id = %tenant, order_id, total = %snapshot.total, surcharge = %snapshot.surcharge, "Order paid");
        Ok(snapshot)
    }

    /// Settle every active order of a table in one atomic batch
    pub async fn pay_table(
        &self,
        tenant: TenantId,
        table_id: i64,
    ) -> OrderResult<Vec<OrderSnapshot>> {
        let table = self
            .store
            .find_table(tenant, table_id)
            .await?
            .ok_or(OrderError::TableNotFound)?;
        let mut orders = self
            .store
            .list_orders(
                tenant,
                &OrderQuery::for_table(table.id).with_statuses(&OrderStatus::ACTIVE),
            )
            .await?;
        if orders.is_empty() {
            return Err(OrderError::NoActiveOrders);
        }

        let now = now_millis();
        for order in &mut orders {
            order.status = OrderStatus::Paid;
            bump(order, now);
        }
        self.store.save_orders(tenant, &orders).await?;

        tracing::info!(tenant_id = %tenant, table_id, orders = orders.len(), "Table settled");
        let snapshots: Vec<OrderSnapshot> = orders
            .iter()
            .map(|o| OrderSnapshot::new(o, &table.name))
            .collect();
        for snapshot in &snapshots {
            self.publish(snapshot, Audience::KitchenAndTable);
        }
        Ok(snapshots)
    }

    // ========== Internals ==========

    async fn load(&self, tenant: TenantId, order_id: i64) -> OrderResult<Order> {
        self.store
            .find_order(tenant, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    async fn table_by_token(&self, tenant: TenantId, access_token: &str) -> OrderResult<DiningTable> {
        self.store
            .find_table_by_token(tenant, access_token)
            .await?
            .ok_or(OrderError::TableNotFound)
    }

    async fn table_name(&self, tenant: TenantId, table_id: i64) -> OrderResult<String> {
        Ok(self
            .store
            .find_table(tenant, table_id)
            .await?
            .map(|t| t.name)
            .unwrap_or_default())
    }

    async fn snapshots(&self, tenant: TenantId, orders: &[Order]) -> OrderResult<Vec<OrderSnapshot>> {
        let names: HashMap<i64, String> = self
            .store
            .list_tables(tenant)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        Ok(orders
            .iter()
            .map(|o| {
                let name = names.get(&o.table_id).map(String::as_str).unwrap_or_default();
                OrderSnapshot::new(o, name)
            })
            .collect())
    }

    /// Build lines from menu items of `tenant`, freezing name and price
    async fn price_lines(
        &self,
        tenant: TenantId,
        order_id: i64,
        inputs: &[OrderLineInput],
    ) -> OrderResult<Vec<OrderLine>> {
        let ids: Vec<i64> = inputs
            .iter()
            .map(|l| l.menu_item_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let items: HashMap<i64, _> = self
            .store
            .find_menu_items(tenant, &ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        inputs
            .iter()
            .map(|input| {
                let item = items
                    .get(&input.menu_item_id)
                    .filter(|m| !m.is_deleted)
                    .ok_or(OrderError::MenuItemNotFound(input.menu_item_id))?;
                if !item.is_available() {
                    return Err(OrderError::OutOfStock {
                        menu_item_id: item.id,
                        name: item.name.clone(),
                    });
                }
                Ok(OrderLine {
                    id: snowflake_id(),
                    order_id,
                    menu_item_id: item.id,
                    menu_item_name: item.name.clone(),
                    quantity: input.quantity,
                    note: input.note.clone().filter(|n| !n.trim().is_empty()),
                    price_at_order: item.price,
                })
            })
            .collect()
    }

    /// Persist one mutated order, then fan out
    async fn commit(
        &self,
        tenant: TenantId,
        mut order: Order,
        audience: Audience,
    ) -> OrderResult<OrderSnapshot> {
        let table_name = self.table_name(tenant, order.table_id).await?;

        bump(&mut order, now_millis());
        if let Err(e) = self.store.save_orders(tenant, std::slice::from_ref(&order)).await {
            tracing::warn!(tenant_id = %tenant, order_id = order.id, error = %e, "Order write rejected");
            return Err(e.into());
        }

        let snapshot = OrderSnapshot::new(&order, table_name);
        self.publish(&snapshot, audience);
        Ok(snapshot)
    }

    fn publish(&self, snapshot: &OrderSnapshot, audience: Audience) {
        let table = Topic::Table {
            tenant_id: snapshot.tenant_id,
            table_id: snapshot.table_id,
        };
        let topics = match audience {
            Audience::KitchenAndTable => vec![Topic::Kitchen(snapshot.tenant_id), table],
            Audience::TableOnly => vec![table],
        };
        self.outbox
            .emit(topics, Notification::OrderUpdated(snapshot.clone()));
    }
}

fn ensure_editable(order: &Order) -> OrderResult<()> {
    if order.status.is_terminal() {
        return Err(OrderError::NotEditable {
            order_id: order.id,
            status: order.status,
        });
    }
    Ok(())
}

fn bump(order: &mut Order, now: i64) {
    order.version += 1;
    order.updated_at = now;
}
