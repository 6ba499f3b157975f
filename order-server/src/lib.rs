//! order-server: multi-tenant QR table ordering
//!
//! # Module layout
//!
//! ```text
//! order-server/src/
//! ├── tenant/     # host → tenant binding (request extension)
//! ├── auth/       # staff JWT, roles, Identity extractor
//! ├── tables/     # table registry: access tokens, occupancy, staff calls
//! ├── orders/     # order lifecycle engine
//! ├── live/       # outbox, dispatcher, topic hub
//! ├── db/         # DataStore trait + memory / PostgreSQL backends
//! ├── api/        # HTTP + WebSocket routes
//! ├── config.rs   # environment configuration
//! ├── error.rs    # ServiceError bridge
//! ├── logger.rs   # tracing setup
//! ├── seed.rs     # demo data for development
//! └── state.rs    # AppState
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod logger;
pub mod orders;
pub mod seed;
pub mod state;
pub mod tables;
pub mod tenant;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
