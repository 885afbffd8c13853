//! Realtime change feed messages
//!
//! Every write on the server publishes a [`ChangeEvent`] to the store's
//! subscribers. Screens treat an event as "the cached query for this entity
//! is stale" and refetch; the event never carries the row itself.

use serde::{Deserialize, Serialize};

crate::text_enum! {
    /// Table of the row that changed
    pub enum Entity {
        Store => "store",
        Category => "category",
        Product => "product",
        DiningTable => "dining_table",
        TableOrder => "table_order",
        TableOrderItem => "table_order_item",
        Order => "order",
        OrderItem => "order_item",
        Driver => "driver",
        Coupon => "coupon",
        DeliveryZone => "delivery_zone",
    }
}

crate::text_enum! {
    pub enum ChangeAction {
        Insert => "insert",
        Update => "update",
        Delete => "delete",
    }
}

/// A row of `entity` changed in a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub store_id: i64,
    pub entity: Entity,
    pub action: ChangeAction,
    pub id: i64,
    pub at: i64,
}

impl ChangeEvent {
    pub fn new(store_id: i64, entity: Entity, action: ChangeAction, id: i64) -> Self {
        Self {
            store_id,
            entity,
            action,
            id,
            at: crate::util::now_millis(),
        }
    }

    /// Whether a screen caching `entities` should refetch
    pub fn touches(&self, entities: &[Entity]) -> bool {
        entities.contains(&self.entity)
    }
}

/// Server -> subscriber WebSocket frames
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeMessage {
    /// Subscription established
    Ready { store_id: i64 },
    /// A row changed
    Change(ChangeEvent),
    /// Events were dropped; refetch everything
    Resync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_wire_format() {
        let msg = RealtimeMessage::Change(ChangeEvent {
            store_id: 1,
            entity: Entity::TableOrderItem,
            action: ChangeAction::Update,
            id: 9,
            at: 42,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "change");
        assert_eq!(json["entity"], "table_order_item");
        assert_eq!(json["action"], "update");

        let ready = serde_json::to_value(RealtimeMessage::Ready { store_id: 3 }).unwrap();
        assert_eq!(ready, serde_json::json!({"type": "ready", "store_id": 3}));
    }

    #[test]
    fn touches_filters_by_entity() {
        let ev = ChangeEvent::new(1, Entity::Order, ChangeAction::Insert, 5);
        assert!(ev.touches(&[Entity::Order, Entity::OrderItem]));
        assert!(!ev.touches(&[Entity::Product]));
    }
}
