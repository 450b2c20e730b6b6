//! Error types for the store crate.

use std::time::Duration;

use snafu::Snafu;

/// Result type for store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors from the store layer.
///
/// The store is in-memory and infallible on the read path, so the only
/// failure mode is contention for the single writer slot.
#[derive(Debug, Snafu)]
pub enum StoreError {
    /// The writer slot could not be acquired within the configured timeout.
    ///
    /// Retryable: the current writer will release the slot when it commits
    /// or aborts.
    #[snafu(display("write transaction busy: writer slot not acquired within {waited:?}"))]
    Busy {
        /// How long the caller waited before giving up.
        waited: Duration,
    },
}

impl StoreError {
    /// Whether the operation may succeed if simply retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}
