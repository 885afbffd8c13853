//! RealtimeHub: per-store change feed fan-out
//!
//! ```text
//! API handler (write committed)
//!       │ ChangeEvent
//!       ▼
//! RealtimeHub
//!   └── stores: store_id → broadcast::Sender<ChangeEvent>
//!         │
//!         ▼
//!   Realtime WS handler (subscribe → forward → client refetches)
//! ```
//!
//! Data is strictly isolated per store. Events are only published after
//! the write that caused them has committed.

use dashmap::DashMap;
use shared::realtime::{ChangeAction, ChangeEvent, Entity};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity, enough to buffer bursts on a busy service
const BROADCAST_CAPACITY: usize = 256;

/// Per-store change feed hub
#[derive(Clone, Default)]
pub struct RealtimeHub {
    /// store_id → sender
    stores: Arc<DashMap<i64, broadcast::Sender<ChangeEvent>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish one event to the store's subscribers
    pub fn publish(&self, event: ChangeEvent) {
        if let Some(tx) = self.stores.get(&event.store_id) {
            // No subscribers: send returns Err, safe to ignore
            let _ = tx.send(event);
        }
    }

    /// Shorthand for `publish(ChangeEvent::new(..))`
    pub fn notify(&self, store_id: i64, entity: Entity, action: ChangeAction, id: i64) {
        self.publish(ChangeEvent::new(store_id, entity, action, id));
    }

    /// Subscribe to a store's change feed
    pub fn subscribe(&self, store_id: i64) -> broadcast::Receiver<ChangeEvent> {
        self.stores
            .entry(store_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drop the store's channel once nobody listens (called on WS disconnect)
    pub fn release(&self, store_id: i64) {
        self.stores
            .remove_if(&store_id, |_, tx| tx.receiver_count() == 0);
    }

    /// Stores with an open channel
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub fn subscriber_count(&self, store_id: i64) -> usize {
        self.stores
            .get(&store_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_own_store_events() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe(1);

        hub.notify(1, Entity::Order, ChangeAction::Insert, 10);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.store_id, 1);
        assert_eq!(ev.entity, Entity::Order);
        assert_eq!(ev.action, ChangeAction::Insert);
        assert_eq!(ev.id, 10);
    }

    #[tokio::test]
    async fn stores_are_isolated() {
        let hub = RealtimeHub::new();
        let mut rx_a = hub.subscribe(1);
        let mut rx_b = hub.subscribe(2);

        hub.notify(2, Entity::Product, ChangeAction::Update, 5);
        hub.notify(1, Entity::DiningTable, ChangeAction::Update, 6);

        assert_eq!(rx_a.recv().await.unwrap().id, 6);
        assert_eq!(rx_b.recv().await.unwrap().id, 5);
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let hub = RealtimeHub::new();
        hub.notify(9, Entity::Coupon, ChangeAction::Delete, 1);
        assert_eq!(hub.subscriber_count(9), 0);
    }

    #[test]
    fn release_keeps_channel_while_subscribed() {
        let hub = RealtimeHub::new();
        let rx = hub.subscribe(3);
        hub.release(3);
        assert_eq!(hub.subscriber_count(3), 1);

        drop(rx);
        hub.release(3);
        assert_eq!(hub.subscriber_count(3), 0);
        assert!(hub.stores.get(&3).is_none());
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe(1);
        for i in 0..(BROADCAST_CAPACITY as i64 + 10) {
            hub.notify(1, Entity::OrderItem, ChangeAction::Update, i);
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
