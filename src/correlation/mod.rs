//! Correlation of deletion events with previously observed messages
//!
//! Deletion notifications arrive without the original text. This module keeps
//! a short-lived snapshot of every logged message so that a later deletion can
//! be enriched with the deleted content and its author.
//!
//! Key properties:
//! - Bounded: entries older than the retention window are purged by the sweeper
//! - At-most-once: `take` removes the snapshot, a second lookup misses
//! - Last write wins: re-inserting an id replaces the earlier snapshot

mod cache;
mod types;

pub use cache::{CacheStats, CorrelationCache};
pub use types::{MessageId, MessageSnapshot};
