//! Moderation events and the handlers that turn them into audit records

mod handler;
mod types;

pub use handler::{AuditHandler, Disposition};
pub use types::{MessageCreated, MessageDeleted, ModerationEvent};
