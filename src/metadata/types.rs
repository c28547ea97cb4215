use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    /// Channel name without # (e.g., "general")
    pub name: String,

    pub channel_type: ChannelType,

    pub fetched_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    PublicChannel,
    PrivateChannel,
    DirectMessage,
    MultiPartyDirectMessage,
}

impl ChannelType {
    /// Map the `channel_type` string Slack puts on message events
    pub fn from_event_type(value: &str) -> Option<Self> {
        match value {
            "channel" => Some(ChannelType::PublicChannel),
            "group" => Some(ChannelType::PrivateChannel),
            "im" => Some(ChannelType::DirectMessage),
            "mpim" => Some(ChannelType::MultiPartyDirectMessage),
            _ => None,
        }
    }

    /// Direct conversations are not part of any shared workspace channel
    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            ChannelType::DirectMessage | ChannelType::MultiPartyDirectMessage
        )
    }
}

impl ChannelInfo {
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

#[derive(Debug, Clone)]
pub struct UserInfo {
    /// Username/handle (e.g., "john.doe")
    pub name: String,

    pub real_name: Option<String>,

    /// Display name (what shows in Slack)
    pub display_name: Option<String>,

    pub is_bot: bool,

    pub fetched_at: Instant,
}

impl UserInfo {
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }

    /// Best available name for display; empty Slack display names are skipped
    pub fn best_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.real_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or(&self.name)
    }

    /// Stable author label for audit lines, e.g. `Johnny (john.doe)`
    pub fn audit_label(&self) -> String {
        let best = self.best_name();
        if best == self.name {
            self.name.clone()
        } else {
            format!("{} ({})", best, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>, real_name: Option<&str>) -> UserInfo {
        UserInfo {
            name: "john.doe".to_string(),
            real_name: real_name.map(String::from),
            display_name: display_name.map(String::from),
            is_bot: false,
            fetched_at: Instant::now(),
        }
    }

    #[test]
    fn test_user_info_best_name() {
        let u = user(Some("Johnny"), Some("John Doe"));
        assert_eq!(u.best_name(), "Johnny");
        assert_eq!(u.audit_label(), "Johnny (john.doe)");
    }

    #[test]
    fn test_user_info_skips_empty_display_name() {
        let u = user(Some(""), Some("John Doe"));
        assert_eq!(u.best_name(), "John Doe");
    }

    #[test]
    fn test_user_info_fallback_name() {
        let u = user(None, None);
        assert_eq!(u.best_name(), "john.doe");
        assert_eq!(u.audit_label(), "john.doe");
    }

    #[test]
    fn test_channel_type_from_event() {
        assert_eq!(
            ChannelType::from_event_type("channel"),
            Some(ChannelType::PublicChannel)
        );
        assert!(ChannelType::from_event_type("im").unwrap().is_direct());
        assert!(ChannelType::from_event_type("mpim").unwrap().is_direct());
        assert!(!ChannelType::from_event_type("group").unwrap().is_direct());
        assert_eq!(ChannelType::from_event_type("app_home"), None);
    }

    #[test]
    fn test_channel_info_staleness() {
        let info = ChannelInfo {
            name: "general".to_string(),
            channel_type: ChannelType::PublicChannel,
            fetched_at: Instant::now(),
        };
        assert!(!info.is_stale(Duration::from_secs(60)));
    }
}
