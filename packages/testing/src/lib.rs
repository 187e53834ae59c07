#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in fanout packages.

use std::env;
use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long [`with_watchdog()`] lets a test run before failing it.
///
/// Miri executes code orders of magnitude slower than native, so it gets a longer timeout.
pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = if cfg!(miri) {
    Duration::from_secs(60)
} else {
    Duration::from_secs(10)
};

/// Runs a test on a separate thread and fails it if it does not finish within
/// [`DEFAULT_WATCHDOG_TIMEOUT`].
///
/// Code under test that joins on other threads can hang forever when a signal goes missing.
/// The watchdog turns such a hang into a test failure instead of a stuck build.
///
/// # Panics
///
/// Panics if the test exceeds the timeout. A panic inside the test is resumed on the calling
/// thread.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// let answer = with_watchdog(|| 6 * 7);
/// assert_eq!(answer, 42);
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    with_watchdog_timeout(DEFAULT_WATCHDOG_TIMEOUT, test_fn)
}

/// Same as [`with_watchdog()`] but with a custom timeout, for tests that are slow on purpose.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled
/// and the test runs directly on the calling thread, so that mutation testing can observe
/// mutants that hang.
///
/// # Panics
///
/// Panics if the test exceeds `timeout`. A panic inside the test is resumed on the calling
/// thread.
pub fn with_watchdog_timeout<F, R>(timeout: Duration, test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_thread = thread::spawn(move || {
        // If the receiver is gone, the watchdog already gave up on us.
        drop(tx.send(test_fn()));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_thread.join().expect("test thread already delivered its result");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test did not finish within {timeout:?}");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_thread.join() {
            Ok(()) => panic!("test thread exited without delivering a result"),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}
