//! Alert sinks for newly assigned orders

use async_trait::async_trait;
use shared::models::DriverOrder;
use tokio::sync::mpsc;

/// Receives one call per newly seen order
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_new_order(&self, order: &DriverOrder);
}

/// Writes each new order to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_new_order(&self, order: &DriverOrder) {
        tracing::info!(
            order_id = order.id,
            code = %order.code,
            status = %order.status,
            "New delivery assigned"
        );
    }
}

/// Forwards new orders to a channel (UI thread, sound player, push bridge)
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<DriverOrder>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DriverOrder>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify_new_order(&self, order: &DriverOrder) {
        if self.tx.send(order.clone()).is_err() {
            tracing::debug!(order_id = order.id, "New-order receiver dropped");
        }
    }
}
