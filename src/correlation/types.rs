use chrono::{DateTime, Utc};
use std::fmt;

/// Opaque, globally unique message identifier
///
/// Slack identifies a message by its channel and timestamp, so both are
/// folded into the key (e.g. `C09NU1KFXHT:1761520471.000100`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_slack(channel_id: &str, ts: &str) -> Self {
        Self(format!("{}:{}", channel_id, ts))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message as it looked when it was logged. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    /// Raw text body, may contain newlines
    pub content: String,

    /// Display identifier of the sender
    pub author: String,

    /// Channel name the message was posted in
    pub channel: String,

    /// Capture time, drives eviction
    pub captured_at: DateTime<Utc>,
}

impl MessageSnapshot {
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        channel: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            channel: channel.into(),
            captured_at,
        }
    }

    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.captured_at < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_message_id_from_slack() {
        let id = MessageId::from_slack("C123", "1761520471.000100");
        assert_eq!(id.as_str(), "C123:1761520471.000100");
        assert_eq!(id.to_string(), "C123:1761520471.000100");
    }

    #[test]
    fn test_snapshot_age_boundary() {
        let now = Utc::now();
        let snapshot = MessageSnapshot::new("hi", "alice", "general", now);

        assert!(!snapshot.is_older_than(now));
        assert!(!snapshot.is_older_than(now - Duration::seconds(1)));
        assert!(snapshot.is_older_than(now + Duration::milliseconds(1)));
    }
}
