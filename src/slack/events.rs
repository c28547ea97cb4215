//! Socket Mode listener feeding Slack message events into the audit pipeline

use crate::audit::UNKNOWN;
use crate::correlation::MessageId;
use crate::error::{ModLoggerError, Result};
use crate::events::{MessageCreated, MessageDeleted, ModerationEvent};
use crate::metadata::{ChannelType, MetadataCache};
use crate::slack::SlackClient;
use crate::source::{EventSession, EventSource};
use dashmap::DashMap;
use slack_morphism::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Slack retries deliveries it thinks were not acknowledged
const DEDUP_WINDOW: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct ListenerState {
    events: mpsc::Sender<ModerationEvent>,
    metadata: Arc<MetadataCache>,
    processed_events: Arc<DashMap<String, Instant>>,
}

pub struct SlackEventSource {
    slack_client: Arc<SlackClient>,
    metadata: Arc<MetadataCache>,
}

impl SlackEventSource {
    pub fn new(slack_client: Arc<SlackClient>, metadata: Arc<MetadataCache>) -> Self {
        Self {
            slack_client,
            metadata,
        }
    }
}

impl EventSource for SlackEventSource {
    type Session = SlackSession;

    async fn open(&self, events: mpsc::Sender<ModerationEvent>) -> Result<SlackSession> {
        self.slack_client
            .verify_auth()
            .await
            .map_err(|e| ModLoggerError::Activation(e.to_string()))?;
        self.slack_client
            .verify_app_token()
            .await
            .map_err(|e| ModLoggerError::Activation(e.to_string()))?;

        let state = ListenerState {
            events,
            metadata: self.metadata.clone(),
            processed_events: Arc::new(DashMap::new()),
        };

        tracing::debug!("Creating listener environment");
        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.slack_client.get_client())
                .with_error_handler(error_handler)
                .with_user_state(state),
        );

        let callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        let listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment,
            callbacks,
        );

        tracing::info!("Connecting to Slack via Socket Mode");
        listener
            .listen_for(self.slack_client.get_app_token())
            .await
            .map_err(|e| ModLoggerError::Activation(e.to_string()))?;

        // `listen_for` only registers the token; `start` opens the connections
        listener.start().await;
        tracing::info!("Connected to Slack Socket Mode");

        Ok(SlackSession {
            listener,
            metadata: self.metadata.clone(),
        })
    }
}

/// A connected Socket Mode listener
pub struct SlackSession {
    listener: SlackClientSocketModeListener<SlackClientHyperHttpsConnector>,
    metadata: Arc<MetadataCache>,
}

impl EventSession for SlackSession {
    async fn close(self) -> Result<()> {
        tracing::info!("Disconnecting from Slack Socket Mode");
        self.listener.shutdown().await;
        self.metadata.cleanup_stale();
        Ok(())
    }
}

/// Whether a conversation belongs to the shared workspace rather than a DM.
/// Falls back to Slack's `D` id prefix when the conversation type is unknown.
pub fn is_shared_channel(channel_type: Option<ChannelType>, channel_id: Option<&str>) -> bool {
    let Some(channel_id) = channel_id else {
        return false;
    };

    match channel_type {
        Some(kind) => !kind.is_direct(),
        None => !channel_id.starts_with('D'),
    }
}

async fn handle_push_event(
    event: SlackPushEventCallback,
    _client: Arc<SlackHyperClient>,
    user_state: SlackClientEventsUserState,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = {
        let storage = user_state.read().await;
        match storage.get_user_state::<ListenerState>() {
            Some(state) => state.clone(),
            None => {
                tracing::error!("Listener state missing, dropping event");
                return Ok(());
            }
        }
    };

    cleanup_old_events(&state.processed_events);

    let event_key = event.event_id.to_string();
    if !first_delivery(&state.processed_events, &event_key) {
        tracing::debug!(event_key = %event_key, "Duplicate event detected, skipping");
        return Ok(());
    }

    let SlackEventCallbackBody::Message(message) = event.event else {
        tracing::trace!("Unhandled event type");
        return Ok(());
    };

    if let Some(moderation_event) = translate(message, &state.metadata).await
        && state.events.send(moderation_event).await.is_err()
    {
        tracing::debug!("Event queue closed, dropping event");
    }

    Ok(())
}

async fn translate(
    message: SlackMessageEvent,
    metadata: &MetadataCache,
) -> Option<ModerationEvent> {
    let channel_id = message.origin.channel.as_ref().map(|c| c.to_string());
    let channel_type = match message
        .origin
        .channel_type
        .as_ref()
        .and_then(|t| ChannelType::from_event_type(t.0.as_str()))
    {
        Some(kind) => Some(kind),
        None => match channel_id.as_deref() {
            Some(id) => metadata.get_channel_info(id).await.map(|c| c.channel_type),
            None => None,
        },
    };
    let guild_present = is_shared_channel(channel_type, channel_id.as_deref());

    match message.subtype {
        Some(SlackMessageEventType::MessageDeleted) => {
            let deleted_ts = message.deleted_ts?.to_string();
            let id = message_id(channel_id.as_deref(), &deleted_ts);
            let channel = channel_label(channel_id.as_deref(), guild_present, metadata).await;

            tracing::debug!(message_id = %id, channel = %channel, "Message deletion received");

            Some(
                MessageDeleted {
                    id,
                    channel,
                    guild_present,
                }
                .into(),
            )
        }
        None
        | Some(SlackMessageEventType::BotMessage)
        | Some(SlackMessageEventType::FileShare)
        | Some(SlackMessageEventType::ThreadBroadcast) => {
            let id = message_id(channel_id.as_deref(), &message.origin.ts.to_string());
            let mut author_is_bot = message.sender.bot_id.is_some()
                || message.subtype == Some(SlackMessageEventType::BotMessage);

            // Skip name lookups for events the handler is going to discard
            let (author, channel) = if guild_present && !author_is_bot {
                let user = match message.sender.user.as_ref() {
                    Some(user_id) => metadata.get_user_info(user_id.as_ref()).await,
                    None => None,
                };
                author_is_bot |= user.as_ref().is_some_and(|u| u.is_bot);

                let author = user
                    .map(|u| u.audit_label())
                    .or_else(|| message.sender.user.as_ref().map(|u| u.to_string()))
                    .or_else(|| message.sender.username.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let channel = channel_label(channel_id.as_deref(), guild_present, metadata).await;
                (author, channel)
            } else {
                let author = message
                    .sender
                    .user
                    .as_ref()
                    .map(|u| u.to_string())
                    .unwrap_or_default();
                (author, channel_id.clone().unwrap_or_default())
            };

            let content = message
                .content
                .as_ref()
                .and_then(|c| c.text.clone())
                .unwrap_or_default();

            tracing::debug!(
                message_id = %id,
                channel = %channel,
                author_is_bot = author_is_bot,
                content_len = content.len(),
                "Message received"
            );

            Some(
                MessageCreated {
                    id,
                    content,
                    author,
                    channel,
                    guild_present,
                    author_is_bot,
                }
                .into(),
            )
        }
        Some(other) => {
            tracing::trace!(subtype = ?other, "Ignoring message subtype");
            None
        }
    }
}

fn message_id(channel_id: Option<&str>, ts: &str) -> MessageId {
    match channel_id {
        Some(channel_id) => MessageId::from_slack(channel_id, ts),
        None => MessageId::new(ts),
    }
}

async fn channel_label(
    channel_id: Option<&str>,
    guild_present: bool,
    metadata: &MetadataCache,
) -> String {
    match channel_id {
        Some(channel_id) if guild_present => metadata.channel_name(channel_id).await,
        Some(channel_id) => channel_id.to_string(),
        None => UNKNOWN.to_string(),
    }
}

fn error_handler(
    err: Box<dyn std::error::Error + Send + Sync>,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> HttpStatusCode {
    tracing::error!(
        error = %err,
        error_kind = std::any::type_name_of_val(&*err),
        "Slack event error"
    );
    HttpStatusCode::OK
}

/// Record an event id; false when it was already seen inside the window
fn first_delivery(events: &DashMap<String, Instant>, event_key: &str) -> bool {
    events.insert(event_key.to_string(), Instant::now()).is_none()
}

fn cleanup_old_events(events: &DashMap<String, Instant>) {
    let mut removed = 0;

    events.retain(|_key, instant| {
        let keep = instant.elapsed() < DEDUP_WINDOW;
        if !keep {
            removed += 1;
        }
        keep
    });

    if removed > 0 {
        tracing::debug!(removed_count = removed, "Cleaned up old events from cache");
    }
}
