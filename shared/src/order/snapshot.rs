//! Order snapshot - the wire shape of an order
//!
//! Sent in HTTP responses and broadcast as the payload of
//! `order_updated` notifications. `total` is the lines total;
//! `surcharge` travels next to it and is never folded in.

use super::{Order, OrderLine, OrderStatus};
use crate::models::TenantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineSnapshot {
    pub id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub price_at_order: Decimal,
}

impl From<&OrderLine> for OrderLineSnapshot {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.id,
            menu_item_id: line.menu_item_id,
            menu_item_name: line.menu_item_name.clone(),
            quantity: line.quantity,
            note: line.note.clone(),
            price_at_order: line.price_at_order,
        }
    }
}

/// Order snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: i64,
    pub table_id: i64,
    pub table_name: String,
    pub tenant_id: TenantId,
    pub status: OrderStatus,
    /// Lines total
    pub total: Decimal,
    pub surcharge: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surcharge_note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub items: Vec<OrderLineSnapshot>,
}

impl OrderSnapshot {
    pub fn new(order: &Order, table_name: impl Into<String>) -> Self {
        Self {
            id: order.id,
            table_id: order.table_id,
            table_name: table_name.into(),
            tenant_id: order.tenant_id,
            status: order.status,
            total: order.total,
            surcharge: order.surcharge,
            surcharge_note: order.surcharge_note.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: order.lines.iter().map(OrderLineSnapshot::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn surcharge_and_total_are_siblings() {
        let order = Order {
            id: 9,
            tenant_id: TenantId(1),
            table_id: 3,
            status: OrderStatus::Served,
            lines: vec![OrderLine {
                id: 11,
                order_id: 9,
                menu_item_id: 5,
                menu_item_name: "Pho bo".into(),
                quantity: 2,
                note: Some("no onion".into()),
                price_at_order: Decimal::from(50000),
            }],
            total: Decimal::from(100000),
            surcharge: Decimal::from_str("15000").unwrap(),
            surcharge_note: Some("late night".into()),
            version: 4,
            created_at: 1,
            updated_at: 2,
        };

        let json = serde_json::to_value(OrderSnapshot::new(&order, "T1")).unwrap();
        assert_eq!(json["status"], "SERVED");
        assert_eq!(json["total"], "100000");
        assert_eq!(json["surcharge"], "15000");
        assert_eq!(json["table_name"], "T1");
        assert_eq!(json["items"][0]["menu_item_name"], "Pho bo");
        assert_eq!(json["items"][0]["price_at_order"], "50000");
        assert!(json.get("version").is_none());
    }
}
