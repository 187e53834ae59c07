use std::panic;
use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::{CompletionTracker, LauncherBuilder, Worker, WorkerState};

/// How many workers a launcher starts, unless configured otherwise.
pub const DEFAULT_WORKER_COUNT: usize = 20;

/// Starts a fixed batch of identical workers in parallel and blocks until all of them complete.
///
/// Each worker gets a dedicated thread, so the counting phase of every worker can occupy its
/// own processor. Total run time is therefore close to that of a single worker, not the sum of
/// all of them.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use fanout::Launcher;
///
/// let launcher = Launcher::builder()
///     .worker_count(4)
///     .pause(Duration::from_millis(10))
///     .iterations(1_000)
///     .build();
///
/// // Returns once all four workers have completed.
/// launcher.run();
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Launcher {
    worker_count: usize,
    worker: Worker,
}

impl Launcher {
    pub(crate) fn from_parts(worker_count: usize, worker: Worker) -> Self {
        Self {
            worker_count,
            worker,
        }
    }

    /// Creates a launcher for the reference workload: 20 workers, each pausing for one second
    /// and then counting to ten billion.
    ///
    /// Use [`Launcher::builder()`] for a custom configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring the launcher.
    #[must_use]
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::new()
    }

    /// How many workers each run starts.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// The work every worker performs.
    #[must_use]
    pub fn worker(&self) -> Worker {
        self.worker
    }

    /// Starts all workers and blocks until every one of them has completed.
    ///
    /// With a worker count of zero, returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to create a worker thread. Workers that already
    /// started are allowed to finish first, as there is no way to cancel them.
    ///
    /// If a worker panics, the panic is resumed on the calling thread once all workers are done.
    pub fn run(&self) {
        let tracker = CompletionTracker::new();
        self.run_with(&tracker);
    }

    /// Same as [`run()`][Self::run] but registers the workers with a caller-provided tracker.
    ///
    /// This allows the caller to inspect the tracker after the run. Returns once the tracker
    /// has no outstanding registrations at all, so any registrations the caller made earlier
    /// and has not yet signaled will also be waited for.
    ///
    /// # Panics
    ///
    /// See [`run()`][Self::run].
    pub fn run_with(&self, tracker: &CompletionTracker) {
        self.run_observed(tracker, &|_, _| {});
    }

    /// Runs the batch, reporting every state each worker enters to `observe` together with
    /// the index of the worker. Called concurrently from all worker threads.
    pub(crate) fn run_observed(
        &self,
        tracker: &CompletionTracker,
        observe: &(dyn Fn(usize, WorkerState) + Sync),
    ) {
        debug!(
            worker_count = self.worker_count,
            pause = ?self.worker.pause(),
            iterations = self.worker.iterations(),
            "launching workers"
        );

        let start = Instant::now();

        thread::scope(|s| {
            // Everything is registered before the first worker starts, so the wait below
            // cannot be satisfied by a partially launched batch.
            let completions = tracker.register_batch(self.worker_count);

            let workers = completions
                .into_iter()
                .enumerate()
                .map(|(index, completion)| {
                    let worker = self.worker;

                    thread::Builder::new()
                        .name(format!("fanout-worker-{index}"))
                        .spawn_scoped(s, move || {
                            worker.execute_observed(index, completion, |state| {
                                observe(index, state);
                            });
                        })
                        .expect(
                            "failed to spawn worker thread: thread spawning failure is not supported",
                        )
                })
                .collect::<Vec<_>>();

            tracker.wait();

            for worker in workers {
                if let Err(payload) = worker.join() {
                    panic::resume_unwind(payload);
                }
            }
        });

        debug!(
            worker_count = self.worker_count,
            elapsed = ?start.elapsed(),
            "all workers completed"
        );
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use testing::with_watchdog;

    use super::*;

    #[test]
    fn new_uses_reference_configuration() {
        let launcher = Launcher::new();

        assert_eq!(launcher.worker_count(), 20);
        assert_eq!(launcher.worker(), Worker::default());
        assert_eq!(launcher, Launcher::default());
    }

    #[test]
    fn builder_overrides_defaults() {
        let launcher = Launcher::builder()
            .worker_count(3)
            .pause(Duration::from_millis(5))
            .iterations(42)
            .build();

        assert_eq!(launcher.worker_count(), 3);
        assert_eq!(launcher.worker().pause(), Duration::from_millis(5));
        assert_eq!(launcher.worker().iterations(), 42);
    }

    #[test]
    fn zero_workers_registers_nothing() {
        let tracker = CompletionTracker::new();

        Launcher::builder()
            .worker_count(0)
            .build()
            .run_with(&tracker);

        assert_eq!(tracker.registered(), 0);
        assert_eq!(tracker.signaled(), 0);
    }

    #[cfg_attr(miri, ignore)] // Real threads are too slow under Miri.
    #[test]
    fn every_worker_signals_exactly_once() {
        let tracker = CompletionTracker::new();

        Launcher::builder()
            .worker_count(6)
            .pause(Duration::ZERO)
            .iterations(1_000)
            .build()
            .run_with(&tracker);

        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.registered(), 6);
        assert_eq!(tracker.signaled(), 6);
    }

    #[cfg_attr(miri, ignore)] // Real threads are too slow under Miri.
    #[test]
    fn worker_panic_is_resumed_after_whole_batch_signals() {
        with_watchdog(|| {
            const WORKER_COUNT: usize = 5;

            let tracker = CompletionTracker::new();
            let launcher = Launcher::builder()
                .worker_count(WORKER_COUNT)
                .pause(Duration::from_millis(10))
                .iterations(1_000)
                .build();

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                launcher.run_observed(&tracker, &|index, state| {
                    if index == 0 && state == WorkerState::Computing {
                        panic!("worker 0 failed while computing");
                    }
                });
            }));

            let payload = result.expect_err("the worker panic must reach the caller");
            assert_eq!(
                payload.downcast_ref::<&str>(),
                Some(&"worker 0 failed while computing")
            );

            // The failed worker signaled while unwinding and the others ran to completion.
            assert_eq!(tracker.registered(), WORKER_COUNT);
            assert_eq!(tracker.signaled(), WORKER_COUNT);
            assert_eq!(tracker.outstanding(), 0);
        });
    }

    #[cfg_attr(miri, ignore)] // Real threads are too slow under Miri.
    #[test]
    fn observer_sees_every_worker_terminate() {
        let tracker = CompletionTracker::new();
        let terminated = AtomicUsize::new(0);

        Launcher::builder()
            .worker_count(4)
            .pause(Duration::ZERO)
            .iterations(10)
            .build()
            .run_observed(&tracker, &|_, state| {
                if state == WorkerState::Terminated {
                    terminated.fetch_add(1, Ordering::Relaxed);
                }
            });

        assert_eq!(terminated.load(Ordering::Relaxed), 4);
    }
}
