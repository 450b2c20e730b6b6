//! Test assertion helpers.
//!
//! Provides polling-based assertions for async test scenarios.

use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Default polling interval for [`assert_eventually`].
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls a condition until it returns true or the timeout expires.
///
/// Useful for testing background jobs where the exact timing is
/// non-deterministic; avoids flaky tests built on fixed sleeps.
///
/// Returns `true` if the condition became true before the timeout, `false`
/// otherwise.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use clearstream_test_utils::assert_eventually;
///
/// # async fn example() {
/// let done = assert_eventually(Duration::from_secs(1), || true).await;
/// assert!(done);
/// # }
/// ```
pub async fn assert_eventually<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        sleep(DEFAULT_POLL_INTERVAL).await;
    }

    // Final check after timeout
    condition()
}
