//! Start/stop control of the audit pipeline

use crate::audit::AuditWriter;
use crate::config::CacheConfig;
use crate::correlation::CorrelationCache;
use crate::events::AuditHandler;
use crate::source::{EventSession, EventSource};
use crate::sweeper::EvictionSweeper;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Outcome of a start or stop request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlStatus {
    Started,
    AlreadyRunning,
    StartFailed(String),
    Stopped,
    NotRunning,
    StopFailed(String),
}

impl ControlStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ControlStatus::Started => "Bot started successfully.",
            ControlStatus::AlreadyRunning => "Bot is already running.",
            ControlStatus::StartFailed(_) => "Failed to start bot.",
            ControlStatus::Stopped => "Bot stopped successfully.",
            ControlStatus::NotRunning => "Bot is not running.",
            ControlStatus::StopFailed(_) => "Failed to stop bot.",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ControlStatus::StartFailed(_) | ControlStatus::StopFailed(_)
        )
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

struct Running<S> {
    session: S,
    shutdown: oneshot::Sender<()>,
    consumer: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

/// Owns the pipeline for the process lifetime and (re)activates the source
///
/// The cache and the writer are created once; every start wires fresh tasks
/// around them and every stop tears those tasks down again.
pub struct ModLogger<S: EventSource> {
    source: S,
    cache: Arc<CorrelationCache>,
    writer: Arc<AuditWriter>,
    cache_config: CacheConfig,
    queue_capacity: usize,
    running: Mutex<Option<Running<S::Session>>>,
}

impl<S: EventSource> ModLogger<S> {
    pub fn new(
        source: S,
        writer: Arc<AuditWriter>,
        cache_config: CacheConfig,
        queue_capacity: usize,
    ) -> Self {
        Self {
            source,
            cache: Arc::new(CorrelationCache::new()),
            writer,
            cache_config,
            queue_capacity: queue_capacity.max(1),
            running: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<CorrelationCache> {
        &self.cache
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn start(&self) -> ControlStatus {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return ControlStatus::AlreadyRunning;
        }

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let session = match self.source.open(tx).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Failed to activate event source");
                return ControlStatus::StartFailed(e.to_string());
            }
        };

        let handler = Arc::new(AuditHandler::new(self.cache.clone(), self.writer.clone()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let consumer = tokio::spawn(handler.run(rx, shutdown_rx));

        let sweeper = EvictionSweeper::new(
            self.cache.clone(),
            self.cache_config.retention(),
            self.cache_config.sweep_interval(),
        )
        .spawn();

        *running = Some(Running {
            session,
            shutdown: shutdown_tx,
            consumer,
            sweeper,
        });

        tracing::info!(audit_log = %self.writer.path().display(), "Moderation logger started");
        ControlStatus::Started
    }

    pub async fn stop(&self) -> ControlStatus {
        let mut running = self.running.lock().await;
        let Some(active) = running.take() else {
            return ControlStatus::NotRunning;
        };

        let close_result = active.session.close().await;

        // The consumer finishes whatever is already queued before exiting
        let _ = active.shutdown.send(());
        if let Err(e) = active.consumer.await {
            tracing::warn!(error = %e, "Audit handler task ended abnormally");
        }

        active.sweeper.abort();
        self.cache.clear();

        match close_result {
            Ok(()) => {
                tracing::info!("Moderation logger stopped");
                ControlStatus::Stopped
            }
            Err(e) => {
                tracing::error!(error = %e, "Event source did not close cleanly");
                ControlStatus::StopFailed(e.to_string())
            }
        }
    }
}
