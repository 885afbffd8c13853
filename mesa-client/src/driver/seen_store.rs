//! Persisted set of order ids the driver has already been told about

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Seen orders: key = order id
const SEEN_ORDERS_TABLE: TableDefinition<i64, ()> = TableDefinition::new("seen_orders");

/// Store metadata: key = name, value = unix millis
const META_TABLE: TableDefinition<&str, i64> = TableDefinition::new("meta");

/// Set once the first load has been recorded
const SEEDED_KEY: &str = "seeded_at";

#[derive(Debug, Error)]
pub enum SeenStoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Seen store lock poisoned")]
    Poisoned,
}

pub type SeenStoreResult<T> = Result<T, SeenStoreError>;

/// Where the seen set lives between app restarts
pub trait SeenOrderStore: Send + Sync {
    /// `None` until something has been saved
    fn load(&self) -> SeenStoreResult<Option<HashSet<i64>>>;

    /// Replace the stored set
    fn save(&self, seen: &HashSet<i64>) -> SeenStoreResult<()>;
}

/// redb-backed store, survives restarts
#[derive(Clone)]
pub struct RedbSeenStore {
    db: Arc<Database>,
}

impl RedbSeenStore {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> SeenStoreResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open in-memory database
    pub fn open_in_memory() -> SeenStoreResult<Self> {
        Self::init(Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?)
    }

    fn init(db: Database) -> SeenStoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SEEN_ORDERS_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl SeenOrderStore for RedbSeenStore {
    fn load(&self) -> SeenStoreResult<Option<HashSet<i64>>> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(META_TABLE)?;
        if meta.get(SEEDED_KEY)?.is_none() {
            return Ok(None);
        }

        let table = read_txn.open_table(SEEN_ORDERS_TABLE)?;
        let mut seen = HashSet::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            seen.insert(key.value());
        }
        Ok(Some(seen))
    }

    fn save(&self, seen: &HashSet<i64>) -> SeenStoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SEEN_ORDERS_TABLE)?;
            let mut stale = Vec::new();
            for entry in table.iter()? {
                let id = entry?.0.value();
                if !seen.contains(&id) {
                    stale.push(id);
                }
            }
            for id in stale {
                table.remove(id)?;
            }
            for id in seen {
                table.insert(*id, ())?;
            }

            let mut meta = write_txn.open_table(META_TABLE)?;
            if meta.get(SEEDED_KEY)?.is_none() {
                meta.insert(SEEDED_KEY, shared::util::now_millis())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// In-process store for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemorySeenStore {
    seen: Arc<Mutex<Option<HashSet<i64>>>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenOrderStore for MemorySeenStore {
    fn load(&self) -> SeenStoreResult<Option<HashSet<i64>>> {
        Ok(self.seen.lock().map_err(|_| SeenStoreError::Poisoned)?.clone())
    }

    fn save(&self, seen: &HashSet<i64>) -> SeenStoreResult<()> {
        *self.seen.lock().map_err(|_| SeenStoreError::Poisoned)? = Some(seen.clone());
        Ok(())
    }
}
