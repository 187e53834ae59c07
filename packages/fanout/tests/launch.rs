//! End-to-end tests for launching and joining worker batches on real threads.

use std::thread;
use std::time::{Duration, Instant};

use fanout::{CompletionTracker, Launcher};
use testing::{with_watchdog, with_watchdog_timeout};

#[cfg_attr(miri, ignore)]
#[test]
fn zero_workers_returns_immediately() {
    with_watchdog(|| {
        let tracker = CompletionTracker::new();

        let start = Instant::now();
        Launcher::builder()
            .worker_count(0)
            .build()
            .run_with(&tracker);

        // The default pause is one second; we must not have waited for anything.
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(tracker.registered(), 0);
        assert_eq!(tracker.outstanding(), 0);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn run_returns_only_after_every_worker_signaled() {
    with_watchdog(|| {
        let tracker = CompletionTracker::new();

        Launcher::builder()
            .worker_count(20)
            .pause(Duration::from_millis(20))
            .iterations(100_000)
            .build()
            .run_with(&tracker);

        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.registered(), 20);
        assert_eq!(tracker.signaled(), 20);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn run_waits_for_the_pause() {
    with_watchdog(|| {
        let pause = Duration::from_millis(100);

        let start = Instant::now();
        Launcher::builder()
            .worker_count(3)
            .pause(pause)
            .iterations(0)
            .build()
            .run();

        assert!(start.elapsed() >= pause);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn workers_pause_in_parallel() {
    with_watchdog(|| {
        const WORKER_COUNT: u32 = 8;
        let pause = Duration::from_millis(200);

        let start = Instant::now();
        Launcher::builder()
            .worker_count(WORKER_COUNT as usize)
            .pause(pause)
            .iterations(0)
            .build()
            .run();
        let elapsed = start.elapsed();

        // Serial execution would take 8 * 200 ms. Sleeping does not need a processor,
        // so this holds even on a single-core machine.
        let serial = pause.saturating_mul(WORKER_COUNT);
        assert!(
            elapsed.saturating_mul(2) < serial,
            "8 pauses of {pause:?} took {elapsed:?}, expected them to overlap"
        );
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn tracker_accumulates_across_runs() {
    with_watchdog(|| {
        let tracker = CompletionTracker::new();
        let launcher = Launcher::builder()
            .worker_count(4)
            .pause(Duration::ZERO)
            .iterations(1_000)
            .build();

        launcher.run_with(&tracker);
        launcher.run_with(&tracker);

        assert_eq!(tracker.registered(), 8);
        assert_eq!(tracker.signaled(), 8);
        assert_eq!(tracker.outstanding(), 0);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn run_with_also_waits_for_earlier_registrations() {
    with_watchdog(|| {
        let tracker = CompletionTracker::new();
        let launcher = Launcher::builder()
            .worker_count(2)
            .pause(Duration::ZERO)
            .iterations(0)
            .build();

        thread::scope(|s| {
            let external = tracker.register();

            s.spawn(move || {
                thread::sleep(Duration::from_millis(100));
                external.signal();
            });

            let start = Instant::now();
            launcher.run_with(&tracker);

            assert!(start.elapsed() >= Duration::from_millis(50));
            assert_eq!(tracker.outstanding(), 0);
        });

        assert_eq!(tracker.registered(), 3);
        assert_eq!(tracker.signaled(), 3);
    });
}

#[test]
#[ignore = "runs the full reference workload, which keeps every processor busy for seconds"]
fn reference_workload_completes() {
    with_watchdog_timeout(Duration::from_secs(600), || {
        let tracker = CompletionTracker::new();

        Launcher::new().run_with(&tracker);

        assert_eq!(tracker.registered(), 20);
        assert_eq!(tracker.signaled(), 20);
    });
}
