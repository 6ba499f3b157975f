//! Menu Item Model

use super::TenantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item entity
///
/// Menu CRUD lives outside this service; orders only read items and freeze
/// their name and price into order lines. Items referenced by orders are
/// soft-deleted, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub tenant_id: TenantId,
    pub category_id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub out_of_stock: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl MenuItem {
    /// Orderable right now: not soft-deleted and in stock
    #[inline]
    pub fn is_available(&self) -> bool {
        !self.is_deleted && !self.out_of_stock
    }
}
