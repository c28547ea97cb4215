//! Durable moderation audit trail
//!
//! Records are rendered into single self-delimited lines and appended to one
//! log file. The line format is consumed by external tooling:
//!
//! ```text
//! [2024-01-15T10:30:45.123Z] | [MESSAGE] | Channel: general | Author: alice | Content: hello\nworld | 
//! ```

mod record;
mod writer;

pub use record::{
    AuditKind, AuditRecord, FIELD_SEPARATOR, UNKNOWN, UNKNOWN_CONTENT, escape_newlines,
    unescape_newlines,
};
pub use writer::AuditWriter;
