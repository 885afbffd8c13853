//! Driver dashboard: new-order detection
//!
//! ```text
//! DriverWatcher ──poll──► GET /api/driver/orders
//!       │
//!       ▼
//! NewOrderTracker (seen ids vs live ids)
//!       │ new ids            │ seen set
//!       ▼                    ▼
//!   Notifier            SeenOrderStore (redb / memory)
//! ```
//!
//! The first load only seeds the seen set; from then on every order id
//! that appears is announced exactly once.

mod notifier;
mod seen_store;
mod tracker;
mod watcher;

pub use notifier::{ChannelNotifier, LogNotifier, Notifier};
pub use seen_store::{MemorySeenStore, RedbSeenStore, SeenOrderStore, SeenStoreError, SeenStoreResult};
pub use tracker::{NewOrderTracker, Refresh};
pub use watcher::DriverWatcher;
