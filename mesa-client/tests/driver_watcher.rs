// mesa-client/tests/driver_watcher.rs
// Driver watcher against a stub server

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Json, Router, routing::get};
use mesa_client::driver::{
    ChannelNotifier, DriverWatcher, MemorySeenStore, RedbSeenStore, SeenOrderStore, SeenStoreError,
    SeenStoreResult,
};
use mesa_client::{ClientConfig, HttpClient, WatcherConfig};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{DriverOrder, Fulfillment, OrderStatus, PaymentMethod};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "driver-token";

type Orders = Arc<Mutex<Vec<DriverOrder>>>;

fn order(id: i64) -> DriverOrder {
    DriverOrder {
        id,
        code: format!("A{id:03}"),
        customer_name: "João".into(),
        customer_phone: "11988887777".into(),
        fulfillment: Fulfillment::Delivery,
        address: Some("Av. Paulista, 1000".into()),
        zone_name: Some("Centro".into()),
        status: OrderStatus::Ready,
        payment_method: PaymentMethod::Pix,
        total: Decimal::new(6250, 2),
        notes: None,
        created_at: 1_700_000_000_000 + id,
    }
}

async fn driver_orders(
    State(orders): State<Orders>,
    headers: HeaderMap,
) -> Result<Json<Vec<DriverOrder>>, AppError> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !authorized {
        return Err(AppError::new(ErrorCode::TokenInvalid));
    }
    let list = orders.lock().unwrap().clone();
    Ok(Json(list))
}

/// Serve the stub on an ephemeral port, returning its base URL
async fn stub_server(orders: Orders) -> String {
    let app = Router::new()
        .route("/api/driver/orders", get(driver_orders))
        .with_state(orders);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, token: &str) -> HttpClient {
    ClientConfig::new(base_url)
        .with_token(token)
        .with_timeout(5)
        .build_http_client()
        .unwrap()
}

fn set_orders(orders: &Orders, ids: &[i64]) {
    *orders.lock().unwrap() = ids.iter().map(|id| order(*id)).collect();
}

#[tokio::test]
async fn test_refresh_seeds_then_alerts_once() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    set_orders(&orders, &[1, 2]);
    let base_url = stub_server(orders.clone()).await;

    let (notifier, mut rx) = ChannelNotifier::new();
    let mut watcher = DriverWatcher::new(
        client(&base_url, TOKEN),
        WatcherConfig::default(),
        Arc::new(notifier),
    )
    .unwrap();

    let first = watcher.refresh().await.unwrap();
    assert!(first.seeded);
    assert!(rx.try_recv().is_err());

    set_orders(&orders, &[1, 2, 3]);
    let second = watcher.refresh().await.unwrap();
    assert_eq!(second.new_orders.len(), 1);
    assert_eq!(rx.try_recv().unwrap().id, 3);

    // Same list again: nothing to announce
    watcher.refresh().await.unwrap();
    assert!(rx.try_recv().is_err());

    // Order 1 delivered
    set_orders(&orders, &[2, 3]);
    let pruned = watcher.refresh().await.unwrap();
    assert_eq!(pruned.removed, vec![1]);
    assert_eq!(
        watcher.tracker().seen().unwrap(),
        &HashSet::from([2, 3])
    );
}

#[tokio::test]
async fn test_seen_set_survives_restart() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    set_orders(&orders, &[10]);
    let base_url = stub_server(orders.clone()).await;
    let temp_dir = TempDir::new().unwrap();
    let config = WatcherConfig::default().with_seen_store_path(temp_dir.path().join("seen.redb"));

    {
        let (notifier, _rx) = ChannelNotifier::new();
        let mut watcher =
            DriverWatcher::new(client(&base_url, TOKEN), config.clone(), Arc::new(notifier)).unwrap();
        assert!(watcher.refresh().await.unwrap().seeded);
    }

    // New order arrives while the app is closed
    set_orders(&orders, &[10, 11]);

    let (notifier, mut rx) = ChannelNotifier::new();
    let mut watcher =
        DriverWatcher::new(client(&base_url, TOKEN), config, Arc::new(notifier)).unwrap();
    let refresh = watcher.refresh().await.unwrap();
    assert!(!refresh.seeded);
    assert_eq!(rx.try_recv().unwrap().id, 11);
    assert!(rx.try_recv().is_err());
    drop(watcher);

    let store = RedbSeenStore::open(temp_dir.path().join("seen.redb")).unwrap();
    assert_eq!(store.load().unwrap(), Some(HashSet::from([10, 11])));
}

#[tokio::test]
async fn test_api_errors_are_typed() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    let base_url = stub_server(orders).await;

    let err = client(&base_url, "stale").driver_orders().await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TokenInvalid));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_failed_refresh_keeps_state() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    set_orders(&orders, &[1]);
    let base_url = stub_server(orders).await;

    let store = Arc::new(MemorySeenStore::new());
    let (notifier, _rx) = ChannelNotifier::new();
    let mut watcher = DriverWatcher::with_store(
        client(&base_url, "stale"),
        WatcherConfig::default(),
        store.clone(),
        Arc::new(notifier),
    )
    .unwrap();

    assert!(watcher.refresh().await.is_err());
    assert!(!watcher.tracker().is_seeded());
    assert!(store.load().unwrap().is_none());
}

/// Memory store whose saves can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemorySeenStore,
    failing: AtomicBool,
}

impl SeenOrderStore for FlakyStore {
    fn load(&self) -> SeenStoreResult<Option<HashSet<i64>>> {
        self.inner.load()
    }

    fn save(&self, seen: &HashSet<i64>) -> SeenStoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SeenStoreError::Poisoned);
        }
        self.inner.save(seen)
    }
}

#[tokio::test]
async fn test_failed_save_keeps_order_new() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    set_orders(&orders, &[1]);
    let base_url = stub_server(orders.clone()).await;

    let store = Arc::new(FlakyStore::default());
    let (notifier, mut rx) = ChannelNotifier::new();
    let mut watcher = DriverWatcher::with_store(
        client(&base_url, TOKEN),
        WatcherConfig::default(),
        store.clone(),
        Arc::new(notifier),
    )
    .unwrap();
    assert!(watcher.refresh().await.unwrap().seeded);

    set_orders(&orders, &[1, 2]);
    store.failing.store(true, Ordering::SeqCst);
    assert!(watcher.refresh().await.is_err());
    assert_eq!(watcher.tracker().seen().unwrap(), &HashSet::from([1]));
    assert_eq!(store.load().unwrap(), Some(HashSet::from([1])));

    store.failing.store(false, Ordering::SeqCst);
    let refresh = watcher.refresh().await.unwrap();
    assert_eq!(refresh.new_orders.len(), 1);
    assert_eq!(rx.try_recv().unwrap().id, 2);
    assert!(rx.try_recv().is_err());
    assert_eq!(store.load().unwrap(), Some(HashSet::from([1, 2])));
}

#[tokio::test]
async fn test_run_announces_and_stops_on_cancel() {
    let orders: Orders = Arc::new(Mutex::new(vec![]));
    set_orders(&orders, &[1, 2]);
    let base_url = stub_server(orders).await;

    let store = Arc::new(MemorySeenStore::new());
    store.save(&HashSet::from([1])).unwrap();

    let (notifier, mut rx) = ChannelNotifier::new();
    let watcher = DriverWatcher::with_store(
        client(&base_url, TOKEN),
        WatcherConfig::default(),
        store.clone(),
        Arc::new(notifier),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let handle = watcher.spawn(cancel.clone());

    // The first tick fires immediately
    let announced = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(announced.id, 2);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.load().unwrap(), Some(HashSet::from([1, 2])));
}
