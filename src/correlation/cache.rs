//! Time-windowed message cache bridging creation and deletion events

use crate::correlation::types::{MessageId, MessageSnapshot};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub inserted: u64,
    pub hits: u64,
    pub misses: u64,
    pub evicted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    inserted: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evicted: AtomicU64,
}

/// Maps message ids to the snapshot captured when the message was logged
///
/// Every operation locks the shard owning the key, so `put`, `take` and the
/// sweeper's bulk `retain` never observe a half-applied update.
#[derive(Debug, Default)]
pub struct CorrelationCache {
    entries: DashMap<MessageId, MessageSnapshot>,
    counters: Counters,
}

impl CorrelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot for `id`
    pub fn put(&self, id: MessageId, snapshot: MessageSnapshot) {
        self.counters.inserted.fetch_add(1, Ordering::Relaxed);
        if let Some(previous) = self.entries.insert(id.clone(), snapshot) {
            tracing::debug!(
                message_id = %id,
                previous_captured_at = %previous.captured_at,
                "Replaced cached snapshot"
            );
        }
    }

    /// Remove and return the snapshot for `id`
    ///
    /// `None` is the expected outcome for messages sent before the listener
    /// started, already evicted, or already correlated.
    pub fn take(&self, id: &MessageId) -> Option<MessageSnapshot> {
        match self.entries.remove(id) {
            Some((_, snapshot)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(message_id = %id, "Correlation cache hit");
                Some(snapshot)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(message_id = %id, "Correlation cache miss");
                None
            }
        }
    }

    /// Drop every entry captured strictly before `cutoff`, returning how many went
    pub fn evict_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let initial = self.entries.len();
        let mut removed = 0;

        self.entries.retain(|_, snapshot| {
            let keep = !snapshot.is_older_than(cutoff);
            if !keep {
                removed += 1;
            }
            keep
        });

        self.counters
            .evicted
            .fetch_add(removed as u64, Ordering::Relaxed);

        if removed > 0 {
            tracing::info!(
                removed = removed,
                before = initial,
                remaining = self.entries.len(),
                cutoff = %cutoff,
                "Evicted expired correlation entries"
            );
        }

        removed
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every cached snapshot
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        if dropped > 0 {
            tracing::debug!(dropped = dropped, "Cleared correlation cache");
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            inserted: self.counters.inserted.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn snapshot(content: &str, captured_at: DateTime<Utc>) -> MessageSnapshot {
        MessageSnapshot::new(content, "alice#0001", "general", captured_at)
    }

    #[test]
    fn test_take_returns_snapshot_once() {
        let cache = CorrelationCache::new();
        let id = MessageId::new("42");
        let snap = snapshot("hello\nworld", Utc::now());

        cache.put(id.clone(), snap.clone());

        assert_eq!(cache.take(&id), Some(snap));
        assert_eq!(cache.take(&id), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_take_unknown_id_is_absent() {
        let cache = CorrelationCache::new();
        assert_eq!(cache.take(&MessageId::new("99")), None);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_put_last_write_wins() {
        let cache = CorrelationCache::new();
        let id = MessageId::new("7");
        let now = Utc::now();

        cache.put(id.clone(), snapshot("first", now));
        cache.put(id.clone(), snapshot("second", now));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.take(&id).map(|s| s.content), Some("second".to_string()));
    }

    #[test]
    fn test_eviction_boundary() {
        let cache = CorrelationCache::new();
        let retention = Duration::hours(24);
        let epsilon = Duration::seconds(1);
        let inserted_at = Utc::now();
        let id = MessageId::new("1");

        cache.put(id.clone(), snapshot("hi", inserted_at));

        // Sweep just inside the window keeps the entry
        let early_cutoff = (inserted_at + retention - epsilon) - retention;
        assert_eq!(cache.evict_older_than(early_cutoff), 0);
        assert!(cache.contains(&id));

        // Sweep just past the window removes it
        let late_cutoff = (inserted_at + retention + epsilon) - retention;
        assert_eq!(cache.evict_older_than(late_cutoff), 1);
        assert!(!cache.contains(&id));
        assert_eq!(cache.take(&id), None);
    }

    #[test]
    fn test_eviction_only_removes_old_entries() {
        let cache = CorrelationCache::new();
        let now = Utc::now();

        cache.put(MessageId::new("old"), snapshot("a", now - Duration::hours(25)));
        cache.put(MessageId::new("new"), snapshot("b", now - Duration::hours(1)));

        let removed = cache.evict_older_than(now - Duration::hours(24));

        assert_eq!(removed, 1);
        assert!(cache.contains(&MessageId::new("new")));
        assert_eq!(cache.stats().evicted, 1);
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = CorrelationCache::new();
        cache.put(MessageId::new("1"), snapshot("a", Utc::now()));
        cache.put(MessageId::new("2"), snapshot("b", Utc::now()));

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_take_correlates_at_most_once() {
        let cache = Arc::new(CorrelationCache::new());
        let id = MessageId::new("race");
        cache.put(id.clone(), snapshot("contended", Utc::now()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let id = id.clone();
                std::thread::spawn(move || cache.take(&id).is_some())
            })
            .collect();

        let hits = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|hit| *hit)
            .count();

        assert_eq!(hits, 1);
    }
}
