//! Online (delivery / pickup) order models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::table_order::OrderLineInput;
use crate::kitchen::KitchenStatus;

crate::text_enum! {
    /// How the customer receives the order
    pub enum Fulfillment {
        Delivery => "delivery",
        Pickup => "pickup",
    }
}

crate::text_enum! {
    /// Payment method chosen at checkout (settled outside the platform)
    pub enum PaymentMethod {
        Cash => "cash",
        Card => "card",
        Pix => "pix",
    }
}

crate::text_enum! {
    /// Online order lifecycle
    pub enum OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Preparing => "preparing",
        Ready => "ready",
        OutForDelivery => "out_for_delivery",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

impl OrderStatus {
    /// Statuses that still show up on the kitchen display
    pub const KITCHEN_ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    /// Statuses shown on a driver's dashboard
    pub const DRIVER_ACTIVE: [OrderStatus; 2] = [OrderStatus::Ready, OrderStatus::OutForDelivery];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `self -> to` is allowed for an order fulfilled by `fulfillment`.
    ///
    /// Same-status updates are accepted as no-ops.
    pub fn can_transition_to(&self, to: OrderStatus, fulfillment: Fulfillment) -> bool {
        use OrderStatus::*;
        if *self == to {
            return true;
        }
        match (self, to) {
            (Pending, Confirmed) => true,
            (Confirmed, Preparing) => true,
            (Preparing, Ready) => true,
            (Ready, OutForDelivery) => fulfillment == Fulfillment::Delivery,
            (Ready, Delivered) => fulfillment == Fulfillment::Pickup,
            (OutForDelivery, Delivered) => true,
            (Pending | Confirmed | Preparing | Ready, Cancelled) => true,
            _ => false,
        }
    }
}

/// Online order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    /// Short public code used for tracking and on the kitchen display
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub fulfillment: Fulfillment,
    pub address: Option<String>,
    pub delivery_zone_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: OrderStatus,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub driver_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One line of an online order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub kitchen_status: KitchenStatus,
    pub created_at: i64,
}

/// Checkout payload from the digital menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub fulfillment: Fulfillment,
    pub address: Option<String>,
    pub delivery_zone_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderLineInput>,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Staff status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Driver assignment payload (`None` unassigns)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn happy_path_delivery() {
        let f = Fulfillment::Delivery;
        assert!(Pending.can_transition_to(Confirmed, f));
        assert!(Confirmed.can_transition_to(Preparing, f));
        assert!(Preparing.can_transition_to(Ready, f));
        assert!(Ready.can_transition_to(OutForDelivery, f));
        assert!(OutForDelivery.can_transition_to(Delivered, f));
    }

    #[test]
    fn pickup_skips_out_for_delivery() {
        let f = Fulfillment::Pickup;
        assert!(Ready.can_transition_to(Delivered, f));
        assert!(!Ready.can_transition_to(OutForDelivery, f));
        assert!(!Ready.can_transition_to(Delivered, Fulfillment::Delivery));
    }

    #[test]
    fn terminal_states_are_final() {
        for to in [Pending, Confirmed, Preparing, Ready, OutForDelivery] {
            assert!(!Delivered.can_transition_to(to, Fulfillment::Delivery));
            assert!(!Cancelled.can_transition_to(to, Fulfillment::Delivery));
        }
        assert!(!OutForDelivery.can_transition_to(Cancelled, Fulfillment::Delivery));
        assert!(Delivered.is_terminal());
        assert!(!Ready.is_terminal());
    }

    #[test]
    fn same_status_is_noop() {
        assert!(Preparing.can_transition_to(Preparing, Fulfillment::Pickup));
        assert!(Delivered.can_transition_to(Delivered, Fulfillment::Delivery));
    }

    #[test]
    fn no_going_back() {
        assert!(!Ready.can_transition_to(Preparing, Fulfillment::Delivery));
        assert!(!Preparing.can_transition_to(Pending, Fulfillment::Delivery));
    }

    #[test]
    fn pending_must_be_confirmed_first() {
        assert!(!Pending.can_transition_to(Preparing, Fulfillment::Delivery));
        assert!(!Pending.can_transition_to(Ready, Fulfillment::Pickup));
    }
}
