//! Fan-out topics and notification messages
//!
//! ```text
//! kitchen.<tenant_id>   order_updated   (kitchen display)
//! table.<table_id>      order_updated   (customer table screen)
//! staff.<tenant_id>     staff_call      (floor staff)
//! ```

use crate::models::TenantId;
use crate::order::OrderSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod ws;
pub use ws::{ClientCommand, ServerMessage};

/// Broadcast topic.
///
/// The table variant also carries its tenant so two tenants can never share
/// a hub entry, even though only the table id appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Kitchen(TenantId),
    Table { tenant_id: TenantId, table_id: i64 },
    Staff(TenantId),
}

impl Topic {
    pub fn tenant_id(&self) -> TenantId {
        match *self {
            Topic::Kitchen(t) | Topic::Staff(t) => t,
            Topic::Table { tenant_id, .. } => tenant_id,
        }
    }

    /// Parse a wire name (`kitchen.1`, `table.42`, `staff.1`) in the scope
    /// of `tenant_id`. Kitchen and staff names naming another tenant are
    /// rejected.
    pub fn parse(name: &str, tenant_id: TenantId) -> Option<Topic> {
        let (kind, id) = name.split_once('.')?;
        let id: i64 = id.parse().ok()?;
        match kind {
            "kitchen" if id == tenant_id.get() => Some(Topic::Kitchen(tenant_id)),
            "staff" if id == tenant_id.get() => Some(Topic::Staff(tenant_id)),
            "table" => Some(Topic::Table {
                tenant_id,
                table_id: id,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Kitchen(t) => write!(f, "kitchen.{t}"),
            Topic::Table { table_id, .. } => write!(f, "table.{table_id}"),
            Topic::Staff(t) => write!(f, "staff.{t}"),
        }
    }
}

impl Serialize for Topic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of help a table asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallType {
    Service,
    Payment,
}

/// Customer request for staff attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCall {
    pub table_id: i64,
    pub table_name: String,
    pub call_type: CallType,
    pub timestamp: i64,
}

/// Message published on a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    OrderUpdated(OrderSnapshot),
    StaffCall(StaffCall),
}
