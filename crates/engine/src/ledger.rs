//! The points ledger store.
//!
//! [`credit`] is the only approved mutation path for a user's balance: it
//! appends a [`LedgerEntry`] and updates the denormalized `points` field in
//! the same staged write, so `points == sum(history deltas)` at every
//! committed version.

use chrono::{DateTime, Utc};
use clearstream_store::{TxRead, WriteTransaction};
use clearstream_types::{LedgerEntry, PointSource, Result, UserId};

use crate::repo;

/// Applies a signed point delta to a user's balance.
///
/// Returns the balance after the change. Debits pass a negative `delta`.
///
/// # Errors
///
/// - `UserNotFound` if the user does not exist.
/// - `Validation` if `delta` is zero.
/// - `InsufficientBalance` if the debit would drive the balance negative.
///
/// On any error the transaction's staged state is unchanged.
pub fn credit(
    txn: &mut WriteTransaction<'_>,
    user_id: UserId,
    delta: i64,
    reason: impl Into<String>,
    source: PointSource,
    source_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<i64> {
    let mut user = repo::load_user(txn, user_id)?;
    user.apply_entry(LedgerEntry {
        delta,
        reason: reason.into(),
        source,
        source_id,
        created_at: now,
    })?;
    let balance = user.points;
    repo::store_user(txn, &user)?;
    tracing::debug!(user = %user_id, delta, balance, source = %source, "ledger entry appended");
    Ok(balance)
}

/// Current point balance of a user.
///
/// # Errors
///
/// `UserNotFound` if the user does not exist.
pub fn balance<R: TxRead>(txn: &R, user_id: UserId) -> Result<i64> {
    Ok(repo::load_user(txn, user_id)?.points)
}

/// A page of the user's ledger history, newest entries first.
///
/// # Errors
///
/// `UserNotFound` if the user does not exist.
pub fn history<R: TxRead>(
    txn: &R,
    user_id: UserId,
    offset: usize,
    limit: usize,
) -> Result<Vec<LedgerEntry>> {
    let user = repo::load_user(txn, user_id)?;
    Ok(user
        .points_history
        .iter()
        .rev()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect())
}
