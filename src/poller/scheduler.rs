use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::{CycleOutcome, Poller};

/// Fixed-interval driver for a [`Poller`].
///
/// The first tick fires immediately. Each cycle is awaited before the next
/// tick is taken, so cycles never overlap; ticks missed while a slow cycle
/// runs are skipped rather than replayed.
pub struct Scheduler {
    poller: Poller,
    interval: Duration,
}

impl Scheduler {
    pub fn new(poller: Poller, interval: Duration) -> Self {
        Self { poller, interval }
    }

    /// Run cycles until `shutdown` resolves, then hand the poller back
    pub async fn run_until<F>(mut self, shutdown: F) -> Poller
    where
        F: Future<Output = ()>,
    {
        info!(
            "Polling {} every {}",
            self.poller.source_url(),
            humantime::format_duration(self.interval)
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut cycles: u64 = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} cycle(s)", cycles);
                    break;
                }
                _ = ticker.tick() => {
                    trace!("Scheduler tick - starting cycle {}", cycles + 1);
                    let outcome = self.poller.run_cycle().await;
                    cycles += 1;
                    if let CycleOutcome::NoChange(reason) = outcome {
                        debug!("Cycle {} finished without change: {:?}", cycles, reason);
                    }
                }
            }
        }

        self.poller
    }
}
