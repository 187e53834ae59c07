//! Launches a fixed batch of parallel workers and blocks until every one of them has completed.
//!
//! This package is the fan-out/join pattern in its smallest useful form:
//!
//! - [`Launcher`] - starts N identical workers, each on its own thread, and waits for all of them.
//! - [`Worker`] - one unit of work: a pause that consumes no processor time, followed by a
//!   CPU-bound counting loop.
//! - [`CompletionTracker`] - a counter of outstanding workers that the launcher waits on.
//!   Every worker holds a [`CompletionGuard`] and signals through it exactly once.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use fanout::{CompletionTracker, Launcher};
//!
//! let launcher = Launcher::builder()
//!     .worker_count(8)
//!     .pause(Duration::from_millis(10))
//!     .iterations(10_000)
//!     .build();
//!
//! let tracker = CompletionTracker::new();
//! launcher.run_with(&tracker);
//!
//! // Every worker registered before it started and signaled exactly once.
//! assert_eq!(tracker.registered(), 8);
//! assert_eq!(tracker.signaled(), 8);
//! assert_eq!(tracker.outstanding(), 0);
//! ```
//!
//! # Operating principles
//!
//! The tracker is an ordinary value owned by whoever runs the batch. Workers borrow it through
//! scoped threads, which also guarantees that every worker thread has been joined by the time
//! [`Launcher::run()`] returns.
//!
//! A worker signals completion by consuming its guard, and a guard dropped during unwinding
//! signals as well. The launcher therefore never waits forever on a worker that panicked; the
//! panic is resumed on the launching thread once the whole batch is done.
//!
//! # Observability
//!
//! Worker lifecycle is logged via `tracing` at `debug` and `trace` levels. Pause and compute
//! durations and completion signals are recorded as `nm` events named `fanout_*`; collect them
//! with `nm::Report::collect()`.

mod builder;
mod completion_tracker;
mod launcher;
mod metrics;
mod worker;

pub use builder::*;
pub use completion_tracker::*;
pub use launcher::*;
pub use worker::*;
