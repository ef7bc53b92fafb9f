//! Restartable periodic ticks for the session loop.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A cancellable interval.
///
/// `start` and `stop` are idempotent: starting a running ticker keeps its
/// current schedule, so there is never more than one interval per ticker.
/// While stopped, [`tick`](Self::tick) never completes, which lets a stopped
/// ticker sit in a `tokio::select!` without firing.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Starts ticking one period from now, unless already running.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub const fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Waits for the next tick. Pending forever while stopped.
    pub async fn tick(&mut self) {
        match &mut self.interval {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
