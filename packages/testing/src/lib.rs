#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for tests and examples in the pool workspace.

use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout to prevent infinite hangs.
///
/// Blocking collections and pool locks make hangs the most likely failure mode of a broken
/// implementation. If the test takes longer than the timeout to complete, it panics instead of
/// stalling the test run.
///
/// The timeout is 10 seconds under normal conditions and 60 seconds under Miri, where thread
/// synchronization primitives are significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly, so that mutation testing can detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode), or if the test
/// itself panics.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    with_watchdog_timeout(timeout, test_fn)
}

/// Same as [`with_watchdog()`] but with a caller-chosen timeout.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode), or if the test
/// itself panics.
pub fn with_watchdog_timeout<F, R>(timeout: Duration, test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded the {timeout:?} watchdog timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Runs `f` on `thread_count` threads that all start at the same moment, returning the results
/// in thread order.
///
/// Each thread receives its index. All threads wait on a shared barrier before calling `f`, which
/// maximizes contention on whatever `f` touches.
///
/// # Panics
///
/// Resumes the panic of any thread that panicked.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// use testing::run_concurrently;
///
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// let results = run_concurrently(4, {
///     let counter = Arc::clone(&counter);
///     move |index| {
///         counter.fetch_add(1, Ordering::Relaxed);
///         index * 2
///     }
/// });
///
/// assert_eq!(results, vec![0, 2, 4, 6]);
/// assert_eq!(counter.load(Ordering::Relaxed), 4);
/// ```
pub fn run_concurrently<F, R>(thread_count: usize, f: F) -> Vec<R>
where
    F: Fn(usize) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(thread_count));
    let f = Arc::new(f);

    let handles = (0..thread_count)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);

            thread::spawn(move || {
                barrier.wait();
                f(index)
            })
        })
        .collect::<Vec<_>>();

    handles
        .into_iter()
        .map(|handle| match handle.join() {
            Ok(result) => result,
            Err(e) => std::panic::resume_unwind(e),
        })
        .collect()
}
