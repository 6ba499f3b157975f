//! Data models
//!
//! Shared between order-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes (see [`crate::util::snowflake_id`]).

pub mod dining_table;
pub mod menu_item;
pub mod tenant;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use tenant::*;
