//! Order aggregate types

use super::OrderStatus;
use crate::models::TenantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One menu item entry of an order.
///
/// `menu_item_name` and `price_at_order` are copies taken when the line was
/// added; later menu edits never reach existing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub note: Option<String>,
    pub price_at_order: Decimal,
}

impl OrderLine {
    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.price_at_order * Decimal::from(self.quantity)
    }
}

/// Order aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub tenant_id: TenantId,
    pub table_id: i64,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    /// Cached lines total; surcharge is kept apart
    pub total: Decimal,
    pub surcharge: Decimal,
    pub surcharge_note: Option<String>,
    /// Optimistic concurrency counter, 1 on insert, +1 per write
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Sum of `price_at_order × quantity` over the current lines
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Refresh the cached total from the lines themselves
    pub fn recompute_total(&mut self) {
        self.total = self.lines_total();
    }

    pub fn line(&self, line_id: i64) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn line_mut(&mut self, line_id: i64) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.id == line_id)
    }
}

/// Requested line, as sent by a customer or staff member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
}
