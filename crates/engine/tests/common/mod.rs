//! Shared helpers for the engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use clearstream_engine::repo;
use clearstream_store::Database;
use clearstream_test_utils::fixtures;
use clearstream_types::UserId;

static INIT: Once = Once::new();

/// Installs a test tracing subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A database seeded with users `1..=count`.
#[allow(clippy::expect_used)]
pub fn db_with_users(count: i64) -> Arc<Database> {
    init_tracing();
    let db = Arc::new(Database::new());
    let mut txn = db.write().expect("write txn");
    for id in 1..=count {
        repo::store_user(&mut txn, &fixtures::user(id)).expect("store user");
    }
    txn.commit();
    db
}

/// User ids `from..=to` as typed ids.
pub fn user_ids(from: i64, to: i64) -> Vec<UserId> {
    (from..=to).map(UserId::new).collect()
}
