//! Notification fan-out
//!
//! ```text
//! OrderEngine / TableRegistry   (after the store write returns Ok)
//!       │ Outbox::emit(topics, notification)
//!       ▼
//! unbounded mpsc  ──→  run_dispatcher (single task, commit order)
//!                            │ TopicHub::publish(topic, …)
//!                            ▼
//!                      TopicHub: Topic → broadcast::Sender
//!                            │
//!                            ▼
//!                   WebSocket sessions (Subscription per topic)
//! ```
//!
//! Delivery is at-most-once: no subscriber means the message is dropped,
//! a lagging subscriber skips what it missed.

mod hub;
mod outbox;

pub use hub::{Subscription, TopicHub};
pub use outbox::{Envelope, Outbox, OutboxReceiver, run_dispatcher};
