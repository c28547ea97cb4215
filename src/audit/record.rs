use crate::correlation::MessageSnapshot;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Separator placed between every field of an audit line
pub const FIELD_SEPARATOR: &str = " | ";

/// Sentinel for a field that could not be recovered
pub const UNKNOWN: &str = "Unknown";

/// Sentinel content for a deletion that missed the correlation cache
pub const UNKNOWN_CONTENT: &str = "Unknown (not cached)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    Message,
    Deleted,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Message => "MESSAGE",
            AuditKind::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully formed audit log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub channel: String,
    pub author: String,
    pub content: String,
}

impl AuditRecord {
    /// Record for a newly observed message
    pub fn message(snapshot: &MessageSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: AuditKind::Message,
            channel: snapshot.channel.clone(),
            author: snapshot.author.clone(),
            content: snapshot.content.clone(),
        }
    }

    /// Record for a deletion. The channel always comes from the deletion
    /// event; author and content fall back to sentinels on a cache miss.
    pub fn deleted(
        channel: impl Into<String>,
        snapshot: Option<&MessageSnapshot>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (author, content) = match snapshot {
            Some(s) => (s.author.clone(), s.content.clone()),
            None => (UNKNOWN.to_string(), UNKNOWN_CONTENT.to_string()),
        };

        Self {
            timestamp,
            kind: AuditKind::Deleted,
            channel: channel.into(),
            author,
            content,
        }
    }

    pub fn is_correlated(&self) -> bool {
        !(self.kind == AuditKind::Deleted
            && self.author == UNKNOWN
            && self.content == UNKNOWN_CONTENT)
    }

    /// Render the record as exactly one physical line, newline terminated
    pub fn to_line(&self) -> String {
        [
            format!(
                "[{}]",
                self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            format!("[{}]", self.kind),
            format!("Channel: {}", self.channel),
            format!("Author: {}", self.author),
            format!("Content: {}", escape_newlines(&self.content)),
            "\n".to_string(),
        ]
        .join(FIELD_SEPARATOR)
    }
}

/// Replace every newline with the two-character sequence `\n`
pub fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Inverse of [`escape_newlines`]
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap()
    }

    fn alice_snapshot() -> MessageSnapshot {
        MessageSnapshot::new("hello\nworld", "alice#0001", "general", fixed_time())
    }

    #[test]
    fn test_message_line_format() {
        let record = AuditRecord::message(&alice_snapshot(), fixed_time());

        assert_eq!(
            record.to_line(),
            "[2024-01-15T10:30:45.000Z] | [MESSAGE] | Channel: general | Author: alice#0001 | Content: hello\\nworld | \n"
        );
    }

    #[test]
    fn test_multiline_content_is_one_physical_line() {
        let record = AuditRecord::message(&alice_snapshot(), fixed_time());
        let line = record.to_line();

        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
        assert!(line.contains("Content: hello\\nworld"));
    }

    #[test]
    fn test_deleted_with_snapshot() {
        let snapshot = alice_snapshot();
        let record = AuditRecord::deleted("general", Some(&snapshot), fixed_time());

        assert_eq!(record.kind, AuditKind::Deleted);
        assert_eq!(record.author, "alice#0001");
        assert_eq!(record.content, "hello\nworld");
        assert!(record.is_correlated());
        assert!(record.to_line().contains("[DELETED]"));
    }

    #[test]
    fn test_deleted_without_snapshot_uses_sentinels() {
        let record = AuditRecord::deleted("random", None, fixed_time());
        let line = record.to_line();

        assert!(!record.is_correlated());
        assert!(line.contains("Channel: random"));
        assert!(line.contains("Author: Unknown | Content: Unknown (not cached)"));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "line one\nline two\n\nline four";
        let escaped = escape_newlines(original);

        assert!(!escaped.contains('\n'));
        assert_eq!(unescape_newlines(&escaped), original);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(AuditKind::Message.to_string(), "MESSAGE");
        assert_eq!(AuditKind::Deleted.to_string(), "DELETED");
    }
}
