//! Periodic eviction of stale correlation entries

use crate::correlation::CorrelationCache;
use crate::logging::Timer;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct EvictionSweeper {
    cache: Arc<CorrelationCache>,
    retention: Duration,
    period: Duration,
}

/// `tokio::time::interval` panics on a zero period
const MIN_PERIOD: Duration = Duration::from_secs(1);

impl EvictionSweeper {
    pub fn new(cache: Arc<CorrelationCache>, retention: Duration, period: Duration) -> Self {
        Self {
            cache,
            retention,
            period: period.max(MIN_PERIOD),
        }
    }

    /// Cutoff for a sweep running at `now`; `None` when the window reaches
    /// past the earliest representable time
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let window = TimeDelta::from_std(self.retention).ok()?;
        now.checked_sub_signed(window)
    }

    /// Run one sweep as if the clock read `now`
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = self.cutoff(now) else {
            return 0;
        };

        let _timer = Timer::start("correlation_sweep");
        let removed = self.cache.evict_older_than(cutoff);

        tracing::debug!(
            removed = removed,
            remaining = self.cache.len(),
            "Correlation sweep finished"
        );
        removed
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// Spawn the sweep loop; it fires every `period` until the handle is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        tracing::info!(
            period_secs = self.period.as_secs(),
            retention_secs = self.retention.as_secs(),
            "Starting correlation sweeper"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep();
                let stats = self.cache.stats();
                tracing::info!(
                    cached = self.cache.len(),
                    inserted = stats.inserted,
                    hits = stats.hits,
                    misses = stats.misses,
                    evicted = stats.evicted,
                    "Correlation cache statistics"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{MessageId, MessageSnapshot};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn cache_with(id: &str, captured_at: DateTime<Utc>) -> Arc<CorrelationCache> {
        let cache = Arc::new(CorrelationCache::new());
        cache.put(
            MessageId::new(id),
            MessageSnapshot::new("hi", "alice", "general", captured_at),
        );
        cache
    }

    #[test]
    fn test_sweep_keeps_entry_inside_window() {
        let inserted = Utc::now();
        let cache = cache_with("1", inserted);
        let sweeper = EvictionSweeper::new(cache.clone(), DAY, Duration::from_secs(3600));

        let removed = sweeper.sweep_at(inserted + TimeDelta::hours(24) - TimeDelta::seconds(1));

        assert_eq!(removed, 0);
        assert!(cache.contains(&MessageId::new("1")));
    }

    #[test]
    fn test_sweep_removes_entry_past_window() {
        let inserted = Utc::now();
        let cache = cache_with("1", inserted);
        let sweeper = EvictionSweeper::new(cache.clone(), DAY, Duration::from_secs(3600));

        let removed = sweeper.sweep_at(inserted + TimeDelta::hours(24) + TimeDelta::seconds(1));

        assert_eq!(removed, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let inserted = Utc::now();
        let cache = cache_with("1", inserted);
        let sweeper = EvictionSweeper::new(cache, DAY, Duration::from_secs(3600));
        let later = inserted + TimeDelta::hours(48);

        assert_eq!(sweeper.sweep_at(later), 1);
        assert_eq!(sweeper.sweep_at(later), 0);
    }

    #[test]
    fn test_oversized_retention_never_evicts() {
        let cache = cache_with("1", Utc::now());
        let sweeper = EvictionSweeper::new(cache.clone(), Duration::MAX, Duration::from_secs(1));

        assert_eq!(sweeper.sweep(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_raised_to_minimum() {
        let cache = cache_with("stale", Utc::now() - TimeDelta::hours(30));
        let sweeper = EvictionSweeper::new(cache.clone(), DAY, Duration::ZERO);
        assert_eq!(sweeper.period, MIN_PERIOD);

        let handle = sweeper.spawn();
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert!(!handle.is_finished(), "sweeper task must keep running");
        assert!(cache.is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_fires_on_period() {
        let cache = cache_with("stale", Utc::now() - TimeDelta::hours(30));
        let sweeper = EvictionSweeper::new(cache.clone(), DAY, Duration::from_secs(3600));

        let handle = sweeper.spawn();
        tokio::task::yield_now().await;
        assert_eq!(cache.len(), 1, "no sweep before the first period elapses");

        tokio::time::sleep(Duration::from_secs(3601)).await;
        tokio::task::yield_now().await;
        assert!(cache.is_empty());

        handle.abort();
    }
}
