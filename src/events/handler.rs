//! Applies moderation events to the correlation cache and the audit log

use crate::audit::{AuditRecord, AuditWriter};
use crate::correlation::{CorrelationCache, MessageSnapshot};
use crate::events::{MessageCreated, MessageDeleted, ModerationEvent};
use crate::logging::log_error;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Filtered out at the boundary (direct conversation or bot author)
    Ignored,
    /// Appended to the audit log
    Logged(AuditRecord),
    /// The append failed; the record is lost but processing continues
    WriteFailed(AuditRecord),
}

pub struct AuditHandler {
    cache: Arc<CorrelationCache>,
    writer: Arc<AuditWriter>,
}

impl AuditHandler {
    pub fn new(cache: Arc<CorrelationCache>, writer: Arc<AuditWriter>) -> Self {
        Self { cache, writer }
    }

    pub async fn handle(&self, event: ModerationEvent) -> Disposition {
        match event {
            ModerationEvent::Created(created) => self.on_created(created).await,
            ModerationEvent::Deleted(deleted) => self.on_deleted(deleted).await,
        }
    }

    async fn on_created(&self, event: MessageCreated) -> Disposition {
        if !event.guild_present || event.author_is_bot {
            tracing::trace!(
                message_id = %event.id,
                guild_present = event.guild_present,
                author_is_bot = event.author_is_bot,
                "Ignoring message outside tracked channels"
            );
            return Disposition::Ignored;
        }

        let now = Utc::now();
        let snapshot = MessageSnapshot::new(event.content, event.author, event.channel, now);
        let record = AuditRecord::message(&snapshot, now);
        self.cache.put(event.id, snapshot);

        self.append(record).await
    }

    async fn on_deleted(&self, event: MessageDeleted) -> Disposition {
        if !event.guild_present {
            tracing::trace!(message_id = %event.id, "Ignoring deletion outside tracked channels");
            return Disposition::Ignored;
        }

        let snapshot = self.cache.take(&event.id);
        let record = AuditRecord::deleted(event.channel, snapshot.as_ref(), Utc::now());

        tracing::debug!(
            message_id = %event.id,
            correlated = snapshot.is_some(),
            channel = %record.channel,
            "Message deleted"
        );

        self.append(record).await
    }

    async fn append(&self, record: AuditRecord) -> Disposition {
        match self.writer.write(&record).await {
            Ok(()) => Disposition::Logged(record),
            Err(e) => {
                log_error("audit_write", &e);
                Disposition::WriteFailed(record)
            }
        }
    }

    /// Consume events one at a time until the stream ends or `shutdown` fires.
    ///
    /// Events already queued when shutdown is requested are still logged.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<ModerationEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::debug!("Audit handler loop started");
        let mut processed: u64 = 0;

        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => {
                        tracing::trace!(kind = event.kind(), message_id = %event.message_id(), "Handling event");
                        self.handle(event).await;
                        processed += 1;
                    }
                    None => {
                        tracing::debug!("Event stream closed");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    events.close();
                    while let Some(event) = events.recv().await {
                        self.handle(event).await;
                        processed += 1;
                    }
                    tracing::debug!("Shutdown requested, queue drained");
                    break;
                }
            }
        }

        tracing::info!(processed = processed, "Audit handler loop stopped");
    }
}
