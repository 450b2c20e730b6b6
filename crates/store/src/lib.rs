//! Snapshot-isolated, single-writer document store for the ClearStream
//! campaign platform.
//!
//! Documents are stored as opaque byte values (postcard-encoded by the layers
//! above) in 5 fixed tables keyed by Snowflake `i64` identifiers. The store
//! gives the engine the two guarantees its invariants rest on:
//!
//! - **Atomicity**: a write transaction commits all of its staged changes or
//!   none of them.
//! - **Serialized writers**: at most one write transaction exists at a time,
//!   so any check performed inside a write transaction still holds at commit.

#![deny(unsafe_code)]

pub mod db;
pub mod error;
pub mod tables;

pub use db::{CommittedState, Database, DatabaseConfig, ReadTransaction, TxRead, WriteTransaction};
pub use error::{Result, StoreError};
pub use tables::{Table, TableId};
