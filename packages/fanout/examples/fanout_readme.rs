//! Launches a small batch of workers and reports how long the batch took compared to
//! how long the same work would take serially.

use std::time::{Duration, Instant};

use fanout::Launcher;

fn main() {
    let launcher = Launcher::builder()
        .worker_count(8)
        .pause(Duration::from_millis(250))
        .iterations(100_000_000)
        .build();

    let start = Instant::now();
    launcher.run();
    let elapsed = start.elapsed();

    println!(
        "{} workers finished in {elapsed:?} (each paused for {:?} before counting to {})",
        launcher.worker_count(),
        launcher.worker().pause(),
        launcher.worker().iterations()
    );
}
