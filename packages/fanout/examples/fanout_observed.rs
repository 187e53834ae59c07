//! Runs a batch with full logging enabled and prints the collected metrics afterwards.
//!
//! Shows the worker state transitions as `trace` events and the pause/compute durations as
//! `nm` histograms.

use std::time::Duration;

use fanout::{CompletionTracker, Launcher};
use nm::Report;
use tracing::Level;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_thread_names(true)
        .init();

    let tracker = CompletionTracker::new();

    Launcher::builder()
        .worker_count(4)
        .pause(Duration::from_millis(100))
        .iterations(50_000_000)
        .build()
        .run_with(&tracker);

    println!(
        "registered: {}, signaled: {}, outstanding: {}",
        tracker.registered(),
        tracker.signaled(),
        tracker.outstanding()
    );

    println!("{}", Report::collect());
}
