//! Backoff schedule for access-token refresh.

use std::time::Duration;

/// How often a transient refresh failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Total attempts, the first included.
    pub attempts: u32,
    pub first_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            first_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RefreshPolicy {
    /// Pauses between consecutive attempts: one fewer than `attempts`,
    /// doubling from `first_delay` and capped at `max_delay`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        let (first, max) = (self.first_delay, self.max_delay);
        (0..self.attempts.saturating_sub(1))
            .map(move |n| first.saturating_mul(1u32.checked_shl(n).unwrap_or(u32::MAX)).min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn default_schedule() {
        let delays: Vec<_> = RefreshPolicy::default().backoff().collect();
        assert_eq!(delays, ms(&[500, 1000]));
    }

    #[test]
    fn long_schedule_is_capped() {
        let policy = RefreshPolicy {
            attempts: 40,
            ..RefreshPolicy::default()
        };
        let delays: Vec<_> = policy.backoff().collect();
        assert_eq!(delays.len(), 39);
        assert_eq!(&delays[..5], &ms(&[500, 1000, 2000, 4000, 5000])[..]);
        assert!(delays.iter().all(|d| *d <= policy.max_delay));
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RefreshPolicy {
            attempts: 1,
            ..RefreshPolicy::default()
        };
        assert_eq!(policy.backoff().count(), 0);
    }
}
