//! Runs the reference workload: 20 parallel workers, each pausing for one second and then
//! counting to ten billion. Exits once all of them have completed.
//!
//! Produces no output unless enabled via `RUST_LOG`, e.g. `RUST_LOG=fanout=debug`.

use fanout::Launcher;
use nm::Report;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .init();

    Launcher::new().run();

    debug!(report = %Report::collect(), "worker metrics");
}
