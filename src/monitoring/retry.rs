//! Exponential back-off for monitoring queries.
//!
//! A [`BackoffPolicy`] is built once per process and handed to the
//! [`MonitoringHandler`](super::MonitoringHandler); every query gets its own
//! [`ExponentialBackoff`] tracker derived from it.

use rand::Rng;
use std::time::{Duration, Instant};

/// Back-off parameters shared by every query of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    /// Total time after which no further retry is scheduled.
    pub max_elapsed_time: Duration,
    /// Jitter applied to each wait, as a fraction of it (0.0 disables).
    pub randomization_factor: f64,
    /// Upper bound on retries after the first attempt, if any.
    pub max_retries: Option<u32>,
}

impl BackoffPolicy {
    /// Zero-delay policy that gives up after `max_retries` retries.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            initial_interval: Duration::ZERO,
            multiplier: 1.0,
            max_interval: Duration::ZERO,
            max_elapsed_time: Duration::from_secs(60),
            randomization_factor: 0.0,
            max_retries: Some(max_retries),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_max_elapsed_time(mut self, max_elapsed_time: Duration) -> Self {
        self.max_elapsed_time = max_elapsed_time;
        self
    }

    /// Start tracking a fresh sequence of retries.
    pub fn start(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            policy: self.clone(),
            current_interval: self.initial_interval,
            start: Instant::now(),
            retries: 0,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(15 * 60),
            randomization_factor: 0.5,
            max_retries: None,
        }
    }
}

/// Back-off state for one query.
pub struct ExponentialBackoff {
    policy: BackoffPolicy,
    current_interval: Duration,
    start: Instant,
    retries: u32,
}

impl ExponentialBackoff {
    /// Return the wait before the next retry, or `None` once the policy is exhausted.
    pub fn next_wait(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_retries {
            if self.retries >= max {
                return None;
            }
        }

        let elapsed = self.start.elapsed();
        if elapsed >= self.policy.max_elapsed_time {
            return None;
        }

        let wait = jittered(self.current_interval, self.policy.randomization_factor);
        // The wait must not carry us past the elapsed budget.
        if elapsed + wait > self.policy.max_elapsed_time {
            return None;
        }

        self.current_interval = self
            .current_interval
            .mul_f64(self.policy.multiplier)
            .min(self.policy.max_interval);
        self.retries += 1;
        Some(wait)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

fn jittered(interval: Duration, factor: f64) -> Duration {
    if factor <= 0.0 || interval.is_zero() {
        return interval;
    }
    let secs = interval.as_secs_f64();
    let delta = secs * factor;
    let mut rng = rand::thread_rng();
    Duration::from_secs_f64(rng.gen_range((secs - delta).max(0.0)..=secs + delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic() -> BackoffPolicy {
        BackoffPolicy {
            initial_interval: Duration::from_millis(100),
            multiplier: 2.0,
            max_interval: Duration::from_millis(500),
            max_elapsed_time: Duration::from_secs(60),
            randomization_factor: 0.0,
            max_retries: None,
        }
    }

    #[test]
    fn test_waits_grow_and_cap() {
        let mut bo = deterministic().start();
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(100)));
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(200)));
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(400)));
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(500)));
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(500)));
        assert_eq!(bo.retries(), 5);
    }

    #[test]
    fn test_retry_limit() {
        let mut bo = BackoffPolicy::immediate(3).start();
        assert_eq!(bo.next_wait(), Some(Duration::ZERO));
        assert_eq!(bo.next_wait(), Some(Duration::ZERO));
        assert_eq!(bo.next_wait(), Some(Duration::ZERO));
        assert_eq!(bo.next_wait(), None);
        assert_eq!(bo.retries(), 3);
    }

    #[test]
    fn test_elapsed_budget_stops_retries() {
        let policy = deterministic().with_max_elapsed_time(Duration::from_millis(250));
        let mut bo = policy.start();
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(100)));
        // 0 + 200ms still fits, the following 400ms wait does not.
        assert_eq!(bo.next_wait(), Some(Duration::from_millis(200)));
        assert_eq!(bo.next_wait(), None);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = BackoffPolicy::default();
        for _ in 0..100 {
            let mut bo = policy.start();
            let wait = bo.next_wait().unwrap();
            assert!(wait >= Duration::from_millis(250), "{:?}", wait);
            assert!(wait <= Duration::from_millis(750), "{:?}", wait);
        }
    }

    #[test]
    fn test_default_is_unbounded_by_count() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_retries, None);
        assert_eq!(policy.max_elapsed_time, Duration::from_secs(900));
    }
}
