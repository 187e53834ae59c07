use std::time::Duration;

use crate::{DEFAULT_ITERATIONS, DEFAULT_PAUSE, DEFAULT_WORKER_COUNT, Launcher, Worker};

/// Builder for configuring a [`Launcher`].
///
/// Obtain one via [`Launcher::builder()`].
#[derive(Clone, Copy, Debug)]
pub struct LauncherBuilder {
    worker_count: usize,
    pause: Duration,
    iterations: u64,
}

impl LauncherBuilder {
    pub(crate) fn new() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            pause: DEFAULT_PAUSE,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Sets the number of workers started by each run.
    ///
    /// Default is 20. Zero is allowed and makes every run return immediately.
    #[must_use]
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Sets how long each worker sleeps before counting.
    ///
    /// Default is one second.
    #[must_use]
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Sets how many increments each worker performs.
    ///
    /// Default is ten billion.
    #[must_use]
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builds the launcher with the configured settings.
    #[must_use]
    pub fn build(self) -> Launcher {
        Launcher::from_parts(
            self.worker_count,
            Worker::new(self.pause, self.iterations),
        )
    }
}
