//! Database and transaction management for clearstream-store.
//!
//! Provides snapshot-isolated transactions over the 5 fixed tables using a
//! single-writer model: every mutating workflow runs inside one exclusive
//! write transaction, so cross-document invariants checked inside the
//! transaction hold at commit time.
//!
//! # Transaction Isolation (Copy-on-Write)
//!
//! - Read transactions capture an immutable snapshot at start (no locks held)
//! - Write transactions stage changes privately against the snapshot they
//!   opened on
//! - Commit builds the next committed state and publishes it with an atomic
//!   pointer swap, so readers see either all of a transaction or none of it
//! - Dropping a write transaction without committing discards every staged
//!   change
//!
//! Readers never block writers and writers never block readers; writers
//! serialize against each other on the writer slot.
//!
//! # Example
//!
//! ```
//! use clearstream_store::{tables, Database, TxRead};
//!
//! let db = Database::new();
//!
//! let mut txn = db.write()?;
//! txn.insert::<tables::Users>(1, vec![1, 2, 3]);
//! txn.commit();
//!
//! let txn = db.read();
//! let value = txn.get::<tables::Users>(1);
//! assert_eq!(value, Some(vec![1, 2, 3]));
//! # Ok::<(), clearstream_store::StoreError>(())
//! ```

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    error::{Result, StoreError},
    tables::{decode_key, encode_key, Table, TableId},
};

/// Default time a write transaction waits for the writer slot.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Database configuration options.
#[derive(Debug, Clone, bon::Builder)]
pub struct DatabaseConfig {
    /// How long [`Database::write`] waits for the writer slot before
    /// returning [`StoreError::Busy`].
    #[builder(default = DEFAULT_WRITE_TIMEOUT)]
    pub write_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { write_timeout: DEFAULT_WRITE_TIMEOUT }
    }
}

/// An immutable committed version of the whole store.
///
/// Readers hold an `Arc` to one of these; commit replaces the database's
/// current pointer with a new state. Old states stay alive until their last
/// reader drops.
#[derive(Debug)]
pub struct CommittedState {
    /// One ordered map per table, indexed by [`TableId::index`].
    tables: [BTreeMap<Vec<u8>, Vec<u8>>; TableId::COUNT],
    /// Monotonic commit counter, starting at 0 for the empty store.
    version: u64,
}

impl CommittedState {
    fn empty() -> Self {
        Self { tables: std::array::from_fn(|_| BTreeMap::new()), version: 0 }
    }
}

/// The main database handle.
///
/// Thread-safe with interior mutability; clone-free sharing via `Arc` at the
/// call site. Supports concurrent reads and exclusive writes (single-writer
/// model).
pub struct Database {
    /// Current committed state (atomically swapped on commit).
    committed: ArcSwap<CommittedState>,
    /// Writer slot: held for the lifetime of a write transaction.
    write_lock: Mutex<()>,
    /// Configuration.
    config: DatabaseConfig,
}

impl Database {
    /// Creates an empty database with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DatabaseConfig::default())
    }

    /// Creates an empty database with the given configuration.
    #[must_use]
    pub fn with_config(config: DatabaseConfig) -> Self {
        Self {
            committed: ArcSwap::from_pointee(CommittedState::empty()),
            write_lock: Mutex::new(()),
            config,
        }
    }

    /// Begins a read transaction on the current committed snapshot.
    ///
    /// Never blocks and never fails; the snapshot stays stable for the
    /// transaction's lifetime regardless of concurrent commits.
    #[must_use]
    pub fn read(&self) -> ReadTransaction {
        ReadTransaction { snapshot: self.committed.load_full() }
    }

    /// Begins a write transaction, waiting up to the configured timeout for
    /// the writer slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Busy`] if another write transaction holds the
    /// slot for the whole timeout. `Busy` is retryable.
    pub fn write(&self) -> Result<WriteTransaction<'_>> {
        let guard = self
            .write_lock
            .try_lock_for(self.config.write_timeout)
            .ok_or(StoreError::Busy { waited: self.config.write_timeout })?;
        Ok(WriteTransaction {
            db: self,
            _guard: guard,
            base: self.committed.load_full(),
            staged: std::array::from_fn(|_| BTreeMap::new()),
        })
    }

    /// Current committed version (number of commits so far).
    #[must_use]
    pub fn version(&self) -> u64 {
        self.committed.load().version
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

/// Read access shared by read and write transactions.
pub trait TxRead {
    /// Returns the value for `key` in table `T`, if present.
    fn get<T: Table>(&self, key: i64) -> Option<Vec<u8>>;

    /// Returns all entries of table `T` in ascending key order.
    fn scan<T: Table>(&self) -> Vec<(i64, Vec<u8>)>;
}

fn scan_map(map: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<(i64, Vec<u8>)> {
    map.iter()
        .filter_map(|(k, v)| {
            let bytes: [u8; 8] = k.as_slice().try_into().ok()?;
            Some((decode_key(&bytes), v.clone()))
        })
        .collect()
}

/// A read-only transaction over a stable snapshot.
pub struct ReadTransaction {
    snapshot: Arc<CommittedState>,
}

impl ReadTransaction {
    /// The committed version this transaction observes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }
}

impl TxRead for ReadTransaction {
    fn get<T: Table>(&self, key: i64) -> Option<Vec<u8>> {
        self.snapshot.tables[T::ID.index()].get(encode_key(key).as_slice()).cloned()
    }

    fn scan<T: Table>(&self) -> Vec<(i64, Vec<u8>)> {
        scan_map(&self.snapshot.tables[T::ID.index()])
    }
}

/// An exclusive write transaction.
///
/// Reads observe the snapshot the transaction opened on, overlaid with this
/// transaction's own staged writes. Nothing is visible to other transactions
/// until [`WriteTransaction::commit`]; dropping without committing aborts.
pub struct WriteTransaction<'db> {
    db: &'db Database,
    _guard: MutexGuard<'db, ()>,
    base: Arc<CommittedState>,
    /// Staged changes: `Some(value)` is an upsert, `None` a removal.
    staged: [BTreeMap<Vec<u8>, Option<Vec<u8>>>; TableId::COUNT],
}

impl WriteTransaction<'_> {
    /// Stages an insert or overwrite of `key` in table `T`.
    pub fn insert<T: Table>(&mut self, key: i64, value: Vec<u8>) {
        self.staged[T::ID.index()].insert(encode_key(key).to_vec(), Some(value));
    }

    /// Stages a removal of `key` in table `T`. Removing an absent key is a
    /// no-op.
    pub fn remove<T: Table>(&mut self, key: i64) {
        self.staged[T::ID.index()].insert(encode_key(key).to_vec(), None);
    }

    /// Commits all staged changes, making them visible atomically.
    ///
    /// Infallible: the next committed state is built in memory and published
    /// with a single pointer swap.
    pub fn commit(self) {
        let mut tables: [BTreeMap<Vec<u8>, Vec<u8>>; TableId::COUNT] =
            std::array::from_fn(|i| self.base.tables[i].clone());
        for (table, staged) in tables.iter_mut().zip(self.staged.iter()) {
            for (key, change) in staged {
                match change {
                    Some(value) => {
                        table.insert(key.clone(), value.clone());
                    },
                    None => {
                        table.remove(key);
                    },
                }
            }
        }
        let next = CommittedState { tables, version: self.base.version + 1 };
        self.db.committed.store(Arc::new(next));
        // Writer slot releases when the guard drops here.
    }
}

impl TxRead for WriteTransaction<'_> {
    fn get<T: Table>(&self, key: i64) -> Option<Vec<u8>> {
        let encoded = encode_key(key);
        match self.staged[T::ID.index()].get(encoded.as_slice()) {
            Some(change) => change.clone(),
            None => self.base.tables[T::ID.index()].get(encoded.as_slice()).cloned(),
        }
    }

    fn scan<T: Table>(&self) -> Vec<(i64, Vec<u8>)> {
        let mut merged = self.base.tables[T::ID.index()].clone();
        for (key, change) in &self.staged[T::ID.index()] {
            match change {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                },
                None => {
                    merged.remove(key);
                },
            }
        }
        scan_map(&merged)
    }
}
