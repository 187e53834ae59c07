use std::hint::black_box;
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::CompletionGuard;
use crate::metrics::{COMPUTE_MS, PAUSE_MS};

/// How long a worker sleeps before it starts counting, unless configured otherwise.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

/// How many increments a worker performs in its counting loop, unless configured otherwise.
pub const DEFAULT_ITERATIONS: u64 = 10_000_000_000;

/// The phases a worker passes through, in order.
///
/// No phase is skipped and no phase is revisited.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum WorkerState {
    /// The worker exists but has not started executing.
    Created,

    /// The worker is suspended and consumes no processor time.
    Sleeping,

    /// The worker is running its counting loop.
    Computing,

    /// The worker has signaled its completion guard.
    Signaled,

    /// The worker has finished executing.
    Terminated,
}

/// One unit of simulated work: a pause followed by a CPU-bound counting loop.
///
/// All workers launched together share the same configuration; the value is `Copy` so each
/// worker thread takes its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Worker {
    pause: Duration,
    iterations: u64,
}

impl Worker {
    /// Creates a worker that sleeps for `pause` and then counts to `iterations`.
    #[must_use]
    pub const fn new(pause: Duration, iterations: u64) -> Self {
        Self { pause, iterations }
    }

    /// How long the worker sleeps before counting.
    #[must_use]
    pub const fn pause(&self) -> Duration {
        self.pause
    }

    /// How many increments the counting loop performs.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Executes the work on the current thread and then signals `completion`.
    ///
    /// The guard is signaled on every exit path, including unwinding out of this function.
    pub fn execute(&self, index: usize, completion: CompletionGuard<'_>) {
        self.execute_observed(index, completion, |_| {});
    }

    /// Executes the work, reporting every state the worker enters to `observe`.
    pub(crate) fn execute_observed(
        &self,
        index: usize,
        completion: CompletionGuard<'_>,
        mut observe: impl FnMut(WorkerState),
    ) {
        let mut enter = |state: WorkerState| {
            trace!(index, ?state, "worker state changed");
            observe(state);
        };

        enter(WorkerState::Created);

        enter(WorkerState::Sleeping);
        PAUSE_MS.with(|e| e.observe_duration_millis(|| thread::sleep(self.pause)));

        enter(WorkerState::Computing);
        let counted = COMPUTE_MS.with(|e| e.observe_duration_millis(|| count_to(self.iterations)));
        debug_assert_eq!(counted, self.iterations);

        completion.signal();
        enter(WorkerState::Signaled);

        enter(WorkerState::Terminated);
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE, DEFAULT_ITERATIONS)
    }
}

/// Increments a local counter `iterations` times and returns it.
///
/// Every intermediate value passes through `black_box`, which keeps the optimizer from
/// folding the loop into a single addition.
fn count_to(iterations: u64) -> u64 {
    let mut counter: u64 = 0;

    for _ in 0..iterations {
        counter = black_box(counter.wrapping_add(1));
    }

    counter
}
