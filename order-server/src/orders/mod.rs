//! Order lifecycle engine
//!
//! # Command flow
//!
//! ```text
//! handler (tenant bound, identity / table token checked)
//!     │
//!     ▼
//! OrderEngine::<operation>(tenant, …)
//!     ├─ 1. load aggregate(s), tenant-filtered
//!     ├─ 2. validate (inputs, transition table, editability)
//!     ├─ 3. mutate, recompute total, bump version
//!     ├─ 4. DataStore::save_orders  (optimistic, all or nothing)
//!     └─ 5. Outbox::emit            (only after 4 returned Ok)
//! ```

mod engine;
mod error;
pub mod money;

pub use engine::OrderEngine;
pub use error::{OrderError, OrderResult};
