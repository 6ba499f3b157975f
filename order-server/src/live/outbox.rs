//! Outbox: post-commit handoff to the dispatcher

use shared::message::{Notification, Topic};
use tokio::sync::mpsc;

use super::TopicHub;

/// One committed change and the topics interested in it
#[derive(Debug, Clone)]
pub struct Envelope {
    pub topics: Vec<Topic>,
    pub notification: Notification,
}

pub type OutboxReceiver = mpsc::UnboundedReceiver<Envelope>;

/// Cloneable write side. Emitting never blocks the caller.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Outbox {
    pub fn channel() -> (Outbox, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Outbox { tx }, rx)
    }

    /// Call only after the write has committed. Failures are logged, never
    /// surfaced: the write already happened.
    pub fn emit(&self, topics: Vec<Topic>, notification: Notification) {
        if let Err(e) = self.tx.send(Envelope {
            topics,
            notification,
        }) {
            tracing::warn!(topics = ?e.0.topics, "Outbox closed, notification dropped");
        }
    }
}

/// Drain the outbox in commit order and publish every envelope.
///
/// Runs until every [`Outbox`] handle is dropped.
pub async fn run_dispatcher(mut rx: OutboxReceiver, hub: TopicHub) {
    tracing::info!("Notification dispatcher started");
    while let Some(envelope) = rx.recv().await {
        for topic in &envelope.topics {
            let delivered = hub.publish(topic, envelope.notification.clone());
            tracing::trace!(topic = %topic, delivered, "Published");
        }
    }
    tracing::info!("Notification dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{CallType, StaffCall};
    use shared::models::TenantId;

    fn call(table_id: i64) -> Notification {
        Notification::StaffCall(StaffCall {
            table_id,
            table_name: String::new(),
            call_type: CallType::Payment,
            timestamp: 0,
        })
    }

    #[tokio::test]
    async fn dispatcher_preserves_commit_order() {
        let hub = TopicHub::new();
        let topic = Topic::Staff(TenantId(1));
        let mut sub = hub.subscribe(topic);

        let (outbox, rx) = Outbox::channel();
        let handle = tokio::spawn(run_dispatcher(rx, hub.clone()));

        for i in 0..5 {
            outbox.emit(vec![topic], call(i));
        }
        for i in 0..5 {
            assert_eq!(sub.recv().await.unwrap(), call(i));
        }

        drop(outbox);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn emit_after_dispatcher_gone_is_swallowed() {
        let (outbox, rx) = Outbox::channel();
        drop(rx);
        outbox.emit(vec![Topic::Kitchen(TenantId(1))], call(1));
    }
}
