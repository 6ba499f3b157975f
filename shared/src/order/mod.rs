//! Order aggregate
//!
//! - [`Order`] / [`OrderLine`]: the persisted aggregate, one row per order
//!   and one per line, with an optimistic `version`
//! - [`OrderStatus`]: lifecycle and its transition table
//! - [`OrderSnapshot`]: the wire shape broadcast to kitchen and table screens

pub mod snapshot;
pub mod status;
pub mod types;

// Re-exports
pub use snapshot::{OrderLineSnapshot, OrderSnapshot};
pub use status::{OrderStatus, ParseOrderStatusError};
pub use types::*;
