//! Human-readable names for Slack channels and users
//!
//! Slack events carry only ids. Audit lines need names, so this module keeps a
//! lazily-populated TTL cache in front of the Web API.
//!
//! - Lazy: a channel or user is fetched the first time an event mentions it
//! - TTL-based: entries are refreshed after an hour by default
//! - Graceful degradation: falls back to the raw id if the API call fails

mod cache;
mod types;

pub use cache::MetadataCache;
pub use types::{ChannelInfo, ChannelType, UserInfo};
