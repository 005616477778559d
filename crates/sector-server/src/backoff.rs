//! Exponential backoff with jitter for feed fetches.
//!
//! A failing upstream feed is retried on a growing delay instead of on every
//! refresh tick. Deadlines use the tokio clock so a paused runtime drives them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    failures: u32,
    next_attempt_at: Instant,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
            failures: 0,
            next_attempt_at: Instant::now(),
            jitter_ratio: 0.2,
        }
    }

    /// When the next attempt is due.
    pub fn next_attempt_at(&self) -> Instant {
        self.next_attempt_at
    }

    /// Consecutive failures since the last success.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.current = self.base;
        self.failures = 0;
        self.next_attempt_at = Instant::now();
    }

    /// Record a failure and return the delay before the next attempt.
    pub fn fail(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        if self.failures > 1 {
            self.current = self.current.saturating_mul(2).min(self.max);
        }
        let delay = add_jitter(self.current, self.jitter_ratio);
        self.next_attempt_at = Instant::now() + delay;
        delay
    }
}

fn add_jitter(delay: Duration, ratio: f64) -> Duration {
    if !(0.0..=1.0).contains(&ratio) {
        return delay;
    }

    let delay_ms = delay.as_millis();
    let jitter_ms_max = ((delay_ms as f64) * ratio) as u128;
    if jitter_ms_max == 0 {
        return delay;
    }

    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u128)
        .unwrap_or(0);
    delay + Duration::from_millis((now_nanos % (jitter_ms_max + 1)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_backoff_is_due_now() {
        let backoff = Backoff::new(Duration::from_millis(10), Duration::from_secs(1));
        assert!(backoff.next_attempt_at() <= Instant::now());
        assert_eq!(backoff.failures(), 0);
    }

    #[test]
    fn first_failure_waits_one_base_interval() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        let delay = backoff.fail();
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(120));
        assert!(backoff.next_attempt_at() > Instant::now());

        let delay = backoff.fail();
        assert!(delay >= Duration::from_millis(200));
        assert_eq!(backoff.failures(), 2);

        backoff.reset();
        assert!(backoff.next_attempt_at() <= Instant::now());
        assert_eq!(backoff.failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn next_attempt_follows_the_returned_delay() {
        let mut backoff = Backoff::new(Duration::from_millis(200), Duration::from_secs(5));
        let started = Instant::now();
        let delay = backoff.fail();
        assert_eq!(backoff.next_attempt_at(), started + delay);

        tokio::time::sleep_until(backoff.next_attempt_at()).await;
        assert_eq!(started.elapsed(), delay);
    }

    #[test]
    fn fail_saturates_at_max() {
        let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(20));
        for _ in 0..5 {
            let delay = backoff.fail();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(24));
        }
    }
}
