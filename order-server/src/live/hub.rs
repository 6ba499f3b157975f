//! TopicHub: per-topic broadcast channels

use dashmap::DashMap;
use shared::message::{Notification, Topic};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity per topic
const BROADCAST_CAPACITY: usize = 256;

/// Topic → broadcast sender. Entries exist only while someone listens.
#[derive(Clone, Default)]
pub struct TopicHub {
    topics: Arc<DashMap<Topic, broadcast::Sender<Notification>>>,
}

impl TopicHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let rx = self
            .topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe();
        Subscription {
            hub: self.clone(),
            topic,
            rx: Some(rx),
        }
    }

    /// Publish to one topic; returns how many subscribers received it
    pub fn publish(&self, topic: &Topic, notification: Notification) -> usize {
        let Some(tx) = self.topics.get(topic) else {
            return 0;
        };
        // send only fails when there are no receivers
        tx.send(notification).unwrap_or(0)
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Number of topics with at least one live entry
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Drop the topic entry once its last receiver is gone
    fn release(&self, topic: &Topic) {
        self.topics
            .remove_if(topic, |_, tx| tx.receiver_count() == 0);
    }
}

/// Receiver handle for one topic; dropping it may clean the topic up.
pub struct Subscription {
    hub: TopicHub,
    topic: Topic,
    rx: Option<broadcast::Receiver<Notification>>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub async fn recv(&mut self) -> Result<Notification, broadcast::error::RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(broadcast::error::RecvError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // receiver must be gone before the count is checked
        self.rx.take();
        self.hub.release(&self.topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{CallType, StaffCall};
    use shared::models::TenantId;

    fn call(table_id: i64) -> Notification {
        Notification::StaffCall(StaffCall {
            table_id,
            table_name: format!("T{table_id}"),
            call_type: CallType::Service,
            timestamp: 0,
        })
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let hub = TopicHub::new();
        let topic = Topic::Staff(TenantId(1));
        let mut sub = hub.subscribe(topic);

        assert_eq!(hub.publish(&topic, call(3)), 1);
        assert_eq!(sub.recv().await.unwrap(), call(3));
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let hub = TopicHub::new();
        assert_eq!(hub.publish(&Topic::Kitchen(TenantId(1)), call(1)), 0);
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn tenant_isolation() {
        let hub = TopicHub::new();
        let mut a = hub.subscribe(Topic::Kitchen(TenantId(1)));
        let mut b = hub.subscribe(Topic::Kitchen(TenantId(2)));

        hub.publish(&Topic::Kitchen(TenantId(1)), call(1));

        assert_eq!(a.recv().await.unwrap(), call(1));
        assert!(matches!(
            b.rx.as_mut().unwrap().try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn same_table_id_other_tenant_does_not_receive() {
        let hub = TopicHub::new();
        let t1 = Topic::Table {
            tenant_id: TenantId(1),
            table_id: 5,
        };
        let t2 = Topic::Table {
            tenant_id: TenantId(2),
            table_id: 5,
        };
        let _s1 = hub.subscribe(t1);
        let _s2 = hub.subscribe(t2);
        assert_eq!(hub.publish(&t1, call(5)), 1);
        assert_eq!(hub.topic_count(), 2);
    }

    #[test]
    fn topic_removed_after_last_subscriber_drops() {
        let hub = TopicHub::new();
        let topic = Topic::Staff(TenantId(9));
        let s1 = hub.subscribe(topic);
        let s2 = hub.subscribe(topic);
        assert_eq!(hub.subscriber_count(&topic), 2);

        drop(s1);
        assert_eq!(hub.topic_count(), 1);
        drop(s2);
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_missed() {
        let hub = TopicHub::new();
        let topic = Topic::Kitchen(TenantId(1));
        let mut sub = hub.subscribe(topic);
        for i in 0..(BROADCAST_CAPACITY as i64 + 10) {
            hub.publish(&topic, call(i));
        }
        assert!(matches!(
            sub.recv().await,
            Err(broadcast::error::RecvError::Lagged(10))
        ));
        assert_eq!(sub.recv().await.unwrap(), call(10));
    }
}
