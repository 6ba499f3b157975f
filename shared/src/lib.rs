//! Shared types for the QR ordering service
//!
//! Domain models, the order status machine, fan-out message types and the
//! unified error system used by `order-server` and its clients.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use message::{Notification, Topic};
pub use models::TenantId;
pub use order::{OrderLineSnapshot, OrderSnapshot, OrderStatus};
