//! Seam between the audit pipeline and whatever transport delivers events

use crate::error::Result;
use crate::events::ModerationEvent;
use std::future::Future;
use tokio::sync::mpsc;

/// Something that can subscribe to message events and push them into a queue
pub trait EventSource: Send + Sync + 'static {
    type Session: EventSession;

    /// Establish a subscription. Failing here is an activation failure and
    /// must leave the source reusable for another attempt.
    fn open(
        &self,
        events: mpsc::Sender<ModerationEvent>,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// A live subscription returned by [`EventSource::open`]
pub trait EventSession: Send + 'static {
    /// Tear the subscription down; no events are delivered afterwards
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}
