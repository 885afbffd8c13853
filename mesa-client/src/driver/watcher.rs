//! Polling loop behind the driver dashboard

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::notifier::Notifier;
use super::seen_store::{MemorySeenStore, RedbSeenStore, SeenOrderStore};
use super::tracker::{NewOrderTracker, Refresh};
use crate::{ClientResult, HttpClient, WatcherConfig};

/// Polls the driver's orders and announces new ones
pub struct DriverWatcher {
    client: HttpClient,
    store: Arc<dyn SeenOrderStore>,
    notifier: Arc<dyn Notifier>,
    tracker: NewOrderTracker,
    config: WatcherConfig,
}

impl DriverWatcher {
    /// Open the configured seen store (redb file, or memory when no path is set)
    pub fn new(
        client: HttpClient,
        config: WatcherConfig,
        notifier: Arc<dyn Notifier>,
    ) -> ClientResult<Self> {
        let store: Arc<dyn SeenOrderStore> = match &config.seen_store_path {
            Some(path) => Arc::new(RedbSeenStore::open(path)?),
            None => Arc::new(MemorySeenStore::new()),
        };
        Self::with_store(client, config, store, notifier)
    }

    pub fn with_store(
        client: HttpClient,
        config: WatcherConfig,
        store: Arc<dyn SeenOrderStore>,
        notifier: Arc<dyn Notifier>,
    ) -> ClientResult<Self> {
        let tracker = NewOrderTracker::from_persisted(store.load()?);
        Ok(Self {
            client,
            store,
            notifier,
            tracker,
            config,
        })
    }

    pub fn tracker(&self) -> &NewOrderTracker {
        &self.tracker
    }

    /// Fetch once, persist the seen set, then alert
    pub async fn refresh(&mut self) -> ClientResult<Refresh> {
        let orders = self.client.driver_orders().await?;

        // The seen set only advances once it is on disk, so a failed save
        // leaves the same orders new for the next tick
        let mut next = self.tracker.clone();
        let refresh = next.refresh(&orders);

        if refresh.changed()
            && let Some(seen) = next.seen()
        {
            self.store.save(seen)?;
        }
        self.tracker = next;

        if refresh.seeded {
            tracing::debug!(orders = orders.len(), "Seen orders seeded");
        }
        for order in &refresh.new_orders {
            self.notifier.notify_new_order(order).await;
        }
        Ok(refresh)
    }

    /// Poll until cancelled; a failed refresh is retried on the next tick
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.config.poll_interval().as_secs(),
            "Driver watcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    match self.refresh().await {
                        Ok(refresh) if !refresh.new_orders.is_empty() => {
                            tracing::info!(new_orders = refresh.new_orders.len(), "New deliveries");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(
                            error = %e,
                            unauthorized = e.is_unauthorized(),
                            "Driver orders refresh failed"
                        ),
                    }
                }
            }
        }

        tracing::info!("Driver watcher stopped");
    }

    /// Run on a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
