//! Fixed-schedule polling of a [`MessageFeed`].

use crate::feed::MessageFeed;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Exponential slow-down while the server keeps failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub multiplier: f64,
    pub max_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub backoff: Option<Backoff>,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            backoff: None,
        }
    }
}

impl PollSchedule {
    pub fn fixed(interval: Duration) -> Self {
        Self { interval, backoff: None }
    }

    /// Wait before the next tick after `failures` consecutive transport errors.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let Some(backoff) = self.backoff else {
            return self.interval;
        };
        if failures == 0 {
            return self.interval;
        }
        let exponent = failures.min(32) as i32;
        let scaled = self.interval.as_secs_f64() * backoff.multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= backoff.max_interval.as_secs_f64() {
            backoff.max_interval
        } else {
            Duration::from_secs_f64(scaled)
        }
    }
}

/// Owns the timer task. Dropping it stops the timer; refreshes already in
/// flight run to completion on their own.
pub struct PollerHandle {
    timer: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.timer.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.timer.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Refresh now, then keep refreshing on `schedule`.
///
/// Each tick runs its refresh as a separate task. The timer waits for that
/// refresh at most one base interval so the backoff sees its outcome; a
/// refresh still running after that is left to finish on its own and the
/// next tick fires on time.
pub fn spawn_poller(feed: Arc<MessageFeed>, schedule: PollSchedule) -> PollerHandle {
    info!("polling every {:?}", schedule.interval);
    let timer = tokio::spawn(async move {
        loop {
            let started = Instant::now();
            let tick_feed = feed.clone();
            let refresh = tokio::spawn(async move {
                tick_feed.refresh().await;
            });
            // timing out only detaches the refresh task
            let _ = tokio::time::timeout(schedule.interval, refresh).await;

            let delay = schedule.delay_after(feed.consecutive_failures());
            if delay != schedule.interval {
                debug!("backing off, next poll in {:?}", delay);
            }
            tokio::time::sleep_until(started + delay).await;
        }
    });
    PollerHandle { timer }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_schedule_ignores_failures() {
        let schedule = PollSchedule::default();
        assert_eq!(schedule.delay_after(0), Duration::from_secs(2));
        assert_eq!(schedule.delay_after(7), Duration::from_secs(2));
    }

    #[test]
    fn backoff_grows_then_caps() {
        let schedule = PollSchedule {
            interval: Duration::from_secs(2),
            backoff: Some(Backoff { multiplier: 2.0, max_interval: Duration::from_secs(30) }),
        };
        assert_eq!(schedule.delay_after(0), Duration::from_secs(2));
        assert_eq!(schedule.delay_after(1), Duration::from_secs(4));
        assert_eq!(schedule.delay_after(3), Duration::from_secs(16));
        assert_eq!(schedule.delay_after(4), Duration::from_secs(30));
        assert_eq!(schedule.delay_after(u32::MAX), Duration::from_secs(30));
    }
}
