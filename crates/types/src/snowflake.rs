//! Snowflake-style globally unique ID generation.
//!
//! Generates 64-bit IDs that are globally unique, roughly time-ordered, and
//! monotonically increasing within a single process. Used for all document
//! identifiers (users, campaigns, orders, items, reports).
//!
//! # ID Structure
//!
//! ```text
//! | 42 bits: timestamp (ms since epoch) | 12 bits: worker | 10 bits: sequence |
//! ```
//!
//! - **Timestamp**: milliseconds since 2024-01-01 00:00:00 UTC (~139 years range)
//! - **Worker**: per-process identifier from entropy mixed with PID (4096 values)
//! - **Sequence**: counter within each millisecond (1024 IDs/ms guaranteed unique per worker)
//!
//! # Thread Safety
//!
//! Uses a global `parking_lot::Mutex` to ensure uniqueness across threads.
//! The lock is held only for the duration of the increment operation.
//!
//! # Security Considerations
//!
//! Snowflake IDs are designed for uniqueness and ordering, not cryptographic
//! security. The timestamp is predictable and the worker ID is random but not
//! cryptographically sensitive. Do not use them as secrets or tokens.

use std::{
    sync::OnceLock,
    time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use snafu::Snafu;

/// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds since Unix epoch).
const EPOCH_MS: u64 = 1_704_067_200_000;

/// Number of bits used for the random worker ID.
const WORKER_BITS: u32 = 12;

/// Number of bits used for the sequence portion.
const SEQUENCE_BITS: u32 = 10;

/// Mask for extracting the worker ID (12 bits).
const WORKER_MASK: u64 = (1 << WORKER_BITS) - 1;

/// Mask for extracting the sequence portion (10 bits).
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// State for sequence-based ID generation.
struct SnowflakeState {
    /// Last timestamp used for ID generation.
    last_timestamp: u64,
    /// Sequence counter within the current millisecond.
    sequence: u64,
}

/// Global state for thread-safe ID generation.
static SNOWFLAKE_STATE: Mutex<SnowflakeState> =
    Mutex::new(SnowflakeState { last_timestamp: 0, sequence: 0 });

/// Per-process worker ID, initialized once from OS entropy mixed with PID.
static WORKER_ID: OnceLock<u64> = OnceLock::new();

/// Returns the per-process worker ID, generating it on first call.
///
/// Mixes the process ID into the random value so that concurrent processes
/// on the same machine produce distinct worker IDs even if the RNG returns
/// identical initial values.
fn worker_id() -> u64 {
    *WORKER_ID.get_or_init(|| {
        use rand::Rng;
        let pid = u64::from(std::process::id());
        (rand::thread_rng().gen::<u64>() ^ pid) & WORKER_MASK
    })
}

/// Errors from Snowflake ID generation.
#[derive(Debug, Snafu)]
pub enum SnowflakeError {
    /// System clock is before the Unix epoch.
    #[snafu(display("system clock is before Unix epoch"))]
    SystemClock,
}

/// Generates a new Snowflake ID.
///
/// Combines a timestamp (milliseconds since 2024-01-01) with a random worker
/// ID and a sequence counter to produce a globally unique, time-ordered
/// identifier. The result is always positive, so it can be used directly as
/// a document key.
///
/// # Errors
///
/// Returns [`SnowflakeError::SystemClock`] if the system clock is before the
/// Unix epoch.
pub fn generate() -> Result<i64, SnowflakeError> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| SnowflakeError::SystemClock)?
        .as_millis() as u64;

    let timestamp = now_ms.saturating_sub(EPOCH_MS);
    let wid = worker_id();

    let mut state = SNOWFLAKE_STATE.lock();

    let sequence = if timestamp > state.last_timestamp {
        // New millisecond, reset sequence
        state.last_timestamp = timestamp;
        state.sequence = 0;
        0
    } else if timestamp == state.last_timestamp {
        // Same millisecond, increment sequence
        state.sequence += 1;
        if state.sequence > SEQUENCE_MASK {
            // Sequence overflow: wait for the next millisecond.
            // Extremely rare (>1024 IDs in 1ms) but handled safely
            drop(state);
            std::thread::sleep(std::time::Duration::from_millis(1));
            return generate();
        }
        state.sequence
    } else {
        // Clock went backwards; keep the last timestamp to stay monotonic
        state.sequence += 1;
        if state.sequence > SEQUENCE_MASK {
            drop(state);
            std::thread::sleep(std::time::Duration::from_millis(1));
            return generate();
        }
        state.sequence
    };

    let raw = (state.last_timestamp << (WORKER_BITS + SEQUENCE_BITS))
        | (wid << SEQUENCE_BITS)
        | sequence;

    // Clear the sign bit so IDs remain positive i64 values.
    Ok((raw & (i64::MAX as u64)) as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_ids_are_positive() {
        for _ in 0..100 {
            let id = generate().expect("generate id");
            assert!(id > 0, "id should be positive: {id}");
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let id = generate().expect("generate id");
            assert!(seen.insert(id), "duplicate id: {id}");
        }
    }

    #[test]
    fn test_burst_generation_survives_sequence_overflow() {
        // Far more than 1024 ids per millisecond, forcing the
        // wait-for-next-tick path many times over.
        let mut seen = HashSet::new();
        let mut last = 0i64;
        for _ in 0..50_000 {
            let id = generate().expect("generate id");
            assert!(id > last, "ids must stay strictly increasing: {last} then {id}");
            assert!(seen.insert(id), "duplicate id in burst: {id}");
            last = id;
        }
    }

    #[test]
    fn test_ids_are_time_ordered_across_milliseconds() {
        let first = generate().expect("generate id");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generate().expect("generate id");
        assert!(second > first);
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..1000).map(|_| generate().expect("generate id")).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("thread join") {
                assert!(seen.insert(id), "duplicate id across threads: {id}");
            }
        }
    }
}
