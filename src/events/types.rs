use crate::correlation::MessageId;

/// A message posted somewhere the listener can see
#[derive(Debug, Clone)]
pub struct MessageCreated {
    pub id: MessageId,
    pub content: String,
    pub author: String,
    pub channel: String,
    /// False for direct and group-direct conversations
    pub guild_present: bool,
    pub author_is_bot: bool,
}

/// A deletion notice. Carries no content, only the id and where it happened.
#[derive(Debug, Clone)]
pub struct MessageDeleted {
    pub id: MessageId,
    pub channel: String,
    pub guild_present: bool,
}

#[derive(Debug, Clone)]
pub enum ModerationEvent {
    Created(MessageCreated),
    Deleted(MessageDeleted),
}

impl ModerationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ModerationEvent::Created(_) => "message_created",
            ModerationEvent::Deleted(_) => "message_deleted",
        }
    }

    pub fn message_id(&self) -> &MessageId {
        match self {
            ModerationEvent::Created(e) => &e.id,
            ModerationEvent::Deleted(e) => &e.id,
        }
    }
}

impl From<MessageCreated> for ModerationEvent {
    fn from(event: MessageCreated) -> Self {
        ModerationEvent::Created(event)
    }
}

impl From<MessageDeleted> for ModerationEvent {
    fn from(event: MessageDeleted) -> Self {
        ModerationEvent::Deleted(event)
    }
}
