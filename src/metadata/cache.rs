//! Lazy TTL cache for channel and user metadata

use crate::error::Result;
use crate::metadata::types::{ChannelInfo, UserInfo};
use crate::slack::SlackClient;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct MetadataCache {
    slack_client: Arc<SlackClient>,
    channels: DashMap<String, ChannelInfo>,
    users: DashMap<String, UserInfo>,
    ttl: Duration,
}

impl MetadataCache {
    pub fn new(slack_client: Arc<SlackClient>) -> Self {
        Self::with_ttl(slack_client, Duration::from_secs(3600))
    }

    pub fn with_ttl(slack_client: Arc<SlackClient>, ttl: Duration) -> Self {
        tracing::info!(ttl_secs = ttl.as_secs(), "Creating metadata cache");

        Self {
            slack_client,
            channels: DashMap::new(),
            users: DashMap::new(),
            ttl,
        }
    }

    /// Get channel info, fetching it if missing or stale
    pub async fn get_channel_info(&self, channel_id: &str) -> Option<ChannelInfo> {
        if let Some(info) = self.channels.get(channel_id)
            && !info.is_stale(self.ttl)
        {
            tracing::trace!(channel_id = %channel_id, channel = %info.name, "Channel cache hit");
            return Some(info.clone());
        }

        match self.fetch_channel_info(channel_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(
                    channel_id = %channel_id,
                    error = %e,
                    "Failed to fetch channel info, will use ID as fallback"
                );
                None
            }
        }
    }

    /// Get user info, fetching it if missing or stale
    pub async fn get_user_info(&self, user_id: &str) -> Option<UserInfo> {
        if let Some(info) = self.users.get(user_id)
            && !info.is_stale(self.ttl)
        {
            tracing::trace!(user_id = %user_id, user = %info.name, "User cache hit");
            return Some(info.clone());
        }

        match self.fetch_user_info(user_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to fetch user info, will use ID as fallback"
                );
                None
            }
        }
    }

    async fn fetch_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        let info = self.slack_client.get_channel_info(channel_id).await?;
        tracing::debug!(channel_id = %channel_id, channel = %info.name, "Fetched channel info");
        self.channels.insert(channel_id.to_string(), info.clone());
        Ok(info)
    }

    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo> {
        let info = self.slack_client.get_user_info(user_id).await?;
        tracing::debug!(user_id = %user_id, user = %info.name, "Fetched user info");
        self.users.insert(user_id.to_string(), info.clone());
        Ok(info)
    }

    /// Channel name for audit lines, the raw id when it cannot be resolved
    pub async fn channel_name(&self, channel_id: &str) -> String {
        self.get_channel_info(channel_id)
            .await
            .map(|c| c.name)
            .unwrap_or_else(|| channel_id.to_string())
    }

    #[cfg(test)]
    pub(crate) fn insert_channel(&self, channel_id: &str, info: ChannelInfo) {
        self.channels.insert(channel_id.to_string(), info);
    }

    #[cfg(test)]
    pub(crate) fn insert_user(&self, user_id: &str, info: UserInfo) {
        self.users.insert(user_id.to_string(), info);
    }

    /// Drop entries past their TTL
    pub fn cleanup_stale(&self) {
        let ttl = self.ttl;
        let initial_channels = self.channels.len();
        let initial_users = self.users.len();

        self.channels.retain(|_, info| !info.is_stale(ttl));
        self.users.retain(|_, info| !info.is_stale(ttl));

        let removed_channels = initial_channels - self.channels.len();
        let removed_users = initial_users - self.users.len();

        if removed_channels > 0 || removed_users > 0 {
            tracing::info!(
                removed_channels = removed_channels,
                removed_users = removed_users,
                remaining_channels = self.channels.len(),
                remaining_users = self.users.len(),
                "Cleaned up stale metadata cache entries"
            );
        }
    }
}
