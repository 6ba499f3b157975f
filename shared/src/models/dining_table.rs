//! Dining Table Model

use super::TenantId;
use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// `access_token` is generated once when the table is created and never
/// changes. It is the only handle customers ever see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub tenant_id: TenantId,
    pub name: String,
    pub capacity: i32,
    pub access_token: String,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub capacity: i32,
}

/// Update dining table payload; the access token is not updatable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
}

/// Derived occupancy of a table; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccupancyStatus {
    /// At least one active order
    Active,
    Empty,
}

/// Staff view of a table (occupancy map, admin listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatus {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub access_token: String,
    pub status: OccupancyStatus,
}

/// Customer view of a table, addressed by token; carries no table id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub capacity: i32,
    pub status: OccupancyStatus,
}
