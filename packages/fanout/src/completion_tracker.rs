use std::iter;
use std::time::{Duration, Instant};

use nm::Event;
use parking_lot::{Condvar, Mutex};

use crate::metrics::COMPLETIONS;

/// Tracks how many registered workers have not yet signaled completion.
///
/// Every registration hands out a [`CompletionGuard`]. Consuming or dropping the guard signals
/// completion, so each registration is signaled exactly once no matter how the worker exits,
/// including by unwinding from a panic.
///
/// The tracker provides its own synchronization and can be shared by reference between any
/// number of threads. It is an ordinary value, not process-wide state, so any number of
/// trackers can exist side by side.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use fanout::CompletionTracker;
///
/// let tracker = CompletionTracker::new();
///
/// thread::scope(|s| {
///     for completion in tracker.register_batch(4) {
///         s.spawn(move || {
///             // Do some work, then report that we are done.
///             completion.signal();
///         });
///     }
///
///     tracker.wait();
/// });
///
/// assert_eq!(tracker.outstanding(), 0);
/// assert_eq!(tracker.signaled(), 4);
/// ```
#[derive(Debug, Default)]
pub struct CompletionTracker {
    counts: Mutex<Counts>,

    // Notified whenever the outstanding count drops to zero.
    all_signaled: Condvar,
}

#[derive(Debug, Default)]
struct Counts {
    registered: usize,
    signaled: usize,
}

impl Counts {
    fn outstanding(&self) -> usize {
        self.registered
            .checked_sub(self.signaled)
            .expect("a registration can only be signaled once, so signals never exceed registrations")
    }
}

impl CompletionTracker {
    /// Creates a tracker with no outstanding registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of work, returning the guard that signals its completion.
    ///
    /// Register before starting the work. Otherwise a concurrent [`wait()`][Self::wait] may
    /// observe zero outstanding registrations and return before the work has even begun.
    #[must_use = "dropping the guard immediately signals completion"]
    pub fn register(&self) -> CompletionGuard<'_> {
        self.add_registrations(1);
        CompletionGuard { tracker: self }
    }

    /// Registers `count` units of work at once.
    ///
    /// The outstanding count rises by `count` in a single step, so no observer ever sees a
    /// partially registered batch.
    #[must_use = "dropping the guards immediately signals completion"]
    pub fn register_batch(&self, count: usize) -> Vec<CompletionGuard<'_>> {
        self.add_registrations(count);

        iter::repeat_with(|| CompletionGuard { tracker: self })
            .take(count)
            .collect()
    }

    /// Blocks the current thread until there are no outstanding registrations.
    ///
    /// Returns immediately if nothing is outstanding, including when nothing was ever
    /// registered.
    pub fn wait(&self) {
        let mut counts = self.counts.lock();

        while counts.outstanding() != 0 {
            self.all_signaled.wait(&mut counts);
        }
    }

    /// Blocks the current thread until there are no outstanding registrations or until
    /// `timeout` has elapsed, whichever comes first.
    ///
    /// Returns `true` if the outstanding count reached zero.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            // A deadline this far in the future is indistinguishable from waiting forever.
            self.wait();
            return true;
        };

        let mut counts = self.counts.lock();

        while counts.outstanding() != 0 {
            if self
                .all_signaled
                .wait_until(&mut counts, deadline)
                .timed_out()
            {
                return counts.outstanding() == 0;
            }
        }

        true
    }

    /// Number of registrations that have not yet signaled completion.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.counts.lock().outstanding()
    }

    /// Total number of registrations made over the lifetime of the tracker.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.counts.lock().registered
    }

    /// Total number of completion signals received over the lifetime of the tracker.
    #[must_use]
    pub fn signaled(&self) -> usize {
        self.counts.lock().signaled
    }

    fn add_registrations(&self, count: usize) {
        let mut counts = self.counts.lock();

        counts.registered = counts
            .registered
            .checked_add(count)
            .expect("registering more than usize::MAX workers is not supported");
    }

    fn signal_one(&self) {
        let outstanding = {
            let mut counts = self.counts.lock();

            #[expect(
                clippy::arithmetic_side_effects,
                reason = "signaled is bounded by registered, which is itself a usize"
            )]
            {
                counts.signaled += 1;
            }

            counts.outstanding()
        };

        COMPLETIONS.with(Event::observe_once);

        if outstanding == 0 {
            self.all_signaled.notify_all();
        }
    }
}

/// Proof of one registration with a [`CompletionTracker`].
///
/// Signals completion exactly once, either explicitly via [`signal()`][Self::signal] or
/// implicitly when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately signals completion"]
pub struct CompletionGuard<'a> {
    tracker: &'a CompletionTracker,
}

impl CompletionGuard<'_> {
    /// Signals that the registered work has completed.
    ///
    /// Equivalent to dropping the guard. Exists to make the signal visible at the call site.
    pub fn signal(self) {
        drop(self);
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.tracker.signal_one();
    }
}
