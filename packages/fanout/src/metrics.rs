//! Metrics for the worker batch.
//!
//! The events are thread-local, so each worker thread observes into its own instance and the
//! workers never contend with each other while recording.

use nm::{Event, Magnitude};

/// Histogram buckets for the worker pause in milliseconds.
///
/// The pause is a fixed sleep, so observations cluster just above the configured duration.
const PAUSE_MS_BUCKETS: &[Magnitude] = &[0, 1, 10, 100, 500, 1000, 2000, 5000];

/// Histogram buckets for the counting loop in milliseconds.
///
/// The reference workload runs for several seconds per worker; tests run for almost nothing.
const COMPUTE_MS_BUCKETS: &[Magnitude] = &[
    0, 1, 10, 100, 1000, 5000, 10_000, 30_000, 60_000, 120_000,
];

thread_local! {
    /// Time each worker spent suspended before it started counting.
    pub(crate) static PAUSE_MS: Event = Event::builder()
        .name("fanout_worker_pause_ms")
        .histogram(PAUSE_MS_BUCKETS)
        .build();

    /// Time each worker spent in the counting loop.
    pub(crate) static COMPUTE_MS: Event = Event::builder()
        .name("fanout_worker_compute_ms")
        .histogram(COMPUTE_MS_BUCKETS)
        .build();

    /// One observation per completion signal received by any tracker.
    pub(crate) static COMPLETIONS: Event = Event::builder()
        .name("fanout_completions")
        .build();
}
