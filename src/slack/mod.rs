mod client;
mod events;

pub use client::SlackClient;
pub use events::{SlackEventSource, SlackSession, is_shared_channel};
